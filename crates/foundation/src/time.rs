use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Wall-clock instant in milliseconds on the host timebase.
///
/// All animation in the engine is sampled from these values, never from frame
/// counters, so behavior does not depend on how often the host ticks.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp(pub f64);

impl Timestamp {
    pub fn from_millis(ms: f64) -> Self {
        Self(ms)
    }

    pub fn as_millis(self) -> f64 {
        self.0
    }

    pub fn as_secs(self) -> f64 {
        self.0 / 1000.0
    }

    /// Milliseconds elapsed since `earlier`, never negative.
    pub fn millis_since(self, earlier: Timestamp) -> f64 {
        let dt = self.0 - earlier.0;
        if dt.is_finite() { dt.max(0.0) } else { 0.0 }
    }
}

pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Hand-driven clock for tests and offline replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now_ms.set(ms);
    }

    pub fn advance(&self, ms: f64) -> Timestamp {
        self.now_ms.set(self.now_ms.get() + ms);
        self.now()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now_ms.get())
    }
}
