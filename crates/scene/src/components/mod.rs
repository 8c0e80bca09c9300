pub mod color;
pub mod ellipse;
pub mod label;
pub mod point;
pub mod polygon;
pub mod polyline;

pub use color::*;
pub use ellipse::*;
pub use label::*;
pub use point::*;
pub use polygon::*;
pub use polyline::*;
