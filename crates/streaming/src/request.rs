/// Identifies one issued request.
///
/// Generations only grow, so a completion can tell whether a newer request
/// has superseded it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Request(pub u64);

/// Tracks the latest request of one kind.
#[derive(Debug, Default)]
pub struct RequestTracker {
    issued: u64,
    current: Option<Request>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new request, superseding any outstanding one.
    pub fn issue(&mut self) -> Request {
        self.issued += 1;
        let req = Request(self.issued);
        self.current = Some(req);
        req
    }

    pub fn is_current(&self, req: Request) -> bool {
        self.current == Some(req)
    }

    /// Drops the outstanding request; its completion will be ignored.
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<Request> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::RequestTracker;

    #[test]
    fn newer_requests_supersede_older_ones() {
        let mut tracker = RequestTracker::new();
        let a = tracker.issue();
        let b = tracker.issue();
        assert!(b > a);
        assert!(!tracker.is_current(a));
        assert!(tracker.is_current(b));
        tracker.invalidate();
        assert!(!tracker.is_current(b));
        assert!(tracker.issue() > b);
    }
}
