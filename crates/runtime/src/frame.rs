use foundation::time::Timestamp;

/// Per-tick frame metadata.
///
/// The host drives ticks from wall-clock time; `dt_ms` is the gap since the
/// previous tick and is never negative.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Wall-clock time of this tick.
    pub now: Timestamp,
    /// Milliseconds since the previous frame.
    pub dt_ms: f64,
}

impl Frame {
    pub fn first(now: Timestamp) -> Self {
        Self {
            index: 0,
            now,
            dt_ms: 0.0,
        }
    }

    pub fn next(self, now: Timestamp) -> Self {
        Self {
            index: self.index + 1,
            now,
            dt_ms: now.millis_since(self.now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Timestamp;

    #[test]
    fn next_advances_index_and_delta() {
        let f0 = Frame::first(Timestamp::from_millis(1_000.0));
        let f1 = f0.next(Timestamp::from_millis(1_016.0));
        assert_eq!(f1.index, 1);
        assert_eq!(f1.dt_ms, 16.0);
    }

    #[test]
    fn clock_going_backwards_gives_zero_delta() {
        let f0 = Frame::first(Timestamp::from_millis(1_000.0));
        let f1 = f0.next(Timestamp::from_millis(900.0));
        assert_eq!(f1.dt_ms, 0.0);
    }
}
