use std::collections::BTreeMap;

use foundation::handles::{Handle, HandleAllocator};
use foundation::time::Timestamp;

/// Names a family of mutually exclusive animations ("crossfade", "camera", ...).
///
/// At most one animation per class is live; starting a new one cancels the
/// previous.
pub type AnimationClass = &'static str;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AnimationHandle {
    handle: Handle,
    class: AnimationClass,
}

impl AnimationHandle {
    pub fn class(&self) -> AnimationClass {
        self.class
    }
}

#[derive(Debug, Copy, Clone)]
struct Running {
    handle: Handle,
    started: Timestamp,
}

/// Registry of in-flight animations.
///
/// Handles are generational, so a handle kept by a cancelled animation never
/// reports live again even after its slot is reused.
#[derive(Debug, Default)]
pub struct Animations {
    alloc: HandleAllocator,
    running: BTreeMap<AnimationClass, Running>,
}

impl Animations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts an animation of `class`, cancelling the previous one of that class.
    pub fn start(&mut self, class: AnimationClass, now: Timestamp) -> AnimationHandle {
        self.cancel_class(class);
        let handle = self.alloc.allocate();
        self.running.insert(
            class,
            Running {
                handle,
                started: now,
            },
        );
        tracing::debug!(class, "animation started");
        AnimationHandle { handle, class }
    }

    pub fn is_active(&self, handle: AnimationHandle) -> bool {
        self.running
            .get(handle.class)
            .is_some_and(|r| r.handle == handle.handle)
    }

    pub fn active(&self, class: AnimationClass) -> Option<AnimationHandle> {
        self.running.get(class).map(|r| AnimationHandle {
            handle: r.handle,
            class,
        })
    }

    pub fn started_at(&self, handle: AnimationHandle) -> Option<Timestamp> {
        self.running
            .get(handle.class)
            .filter(|r| r.handle == handle.handle)
            .map(|r| r.started)
    }

    /// Releases `handle`. Returns `false` if it was already released.
    pub fn cancel(&mut self, handle: AnimationHandle) -> bool {
        if !self.is_active(handle) {
            return false;
        }
        self.running.remove(handle.class);
        self.alloc.free(handle.handle)
    }

    pub fn cancel_class(&mut self, class: AnimationClass) -> bool {
        match self.running.remove(class) {
            Some(r) => {
                tracing::debug!(class, "animation cancelled");
                self.alloc.free(r.handle)
            }
            None => false,
        }
    }

    /// Cancels everything; returns how many animations were live.
    pub fn cancel_all(&mut self) -> usize {
        let running = std::mem::take(&mut self.running);
        for r in running.values() {
            self.alloc.free(r.handle);
        }
        running.len()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

/// Normalized progress of a fixed-duration animation, clamped to `[0, 1]`.
pub fn progress(start: Timestamp, duration_ms: f64, now: Timestamp) -> f64 {
    if duration_ms <= 0.0 || !duration_ms.is_finite() {
        return 1.0;
    }
    (now.millis_since(start) / duration_ms).clamp(0.0, 1.0)
}

/// Cubic ease-in-out used for camera flights.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
