pub mod camera;
pub mod components;
pub mod entity;
pub mod imagery;
pub mod input;
pub mod picking;
pub mod property;
pub mod snapshot;
pub mod tag;
pub mod viewer;
pub mod world;

pub use viewer::*;
pub use world::*;
