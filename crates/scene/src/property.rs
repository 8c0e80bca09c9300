//! Time-varying entity properties.
//!
//! A [`Property`] is either a constant or a pure function of the sampling
//! context. Sampled properties are re-evaluated whenever the scene is
//! rendered, so animation needs no per-frame bookkeeping.

use std::fmt;
use std::rc::Rc;

use foundation::time::Timestamp;

/// Inputs available to a sampled property.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PropertyContext {
    pub time: Timestamp,
    /// Distance from the camera to the entity being evaluated.
    pub camera_distance_m: f64,
}

impl PropertyContext {
    pub fn at(time: Timestamp) -> Self {
        Self {
            time,
            camera_distance_m: 0.0,
        }
    }

    pub fn with_camera_distance(mut self, camera_distance_m: f64) -> Self {
        self.camera_distance_m = camera_distance_m;
        self
    }
}

pub enum Property<T> {
    Constant(T),
    Sampled(Rc<dyn Fn(&PropertyContext) -> T>),
}

impl<T: Clone> Property<T> {
    pub fn sampled(f: impl Fn(&PropertyContext) -> T + 'static) -> Self {
        Property::Sampled(Rc::new(f))
    }

    pub fn evaluate(&self, ctx: &PropertyContext) -> T {
        match self {
            Property::Constant(v) => v.clone(),
            Property::Sampled(f) => f(ctx),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Property::Constant(_))
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        match self {
            Property::Constant(v) => Property::Constant(v.clone()),
            Property::Sampled(f) => Property::Sampled(Rc::clone(f)),
        }
    }
}

impl<T> From<T> for Property<T> {
    fn from(value: T) -> Self {
        Property::Constant(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Property::Sampled(_) => f.write_str("Sampled(..)"),
        }
    }
}
