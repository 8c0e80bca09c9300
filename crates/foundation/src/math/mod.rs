pub mod cartographic;
pub mod ecef;
pub mod geodesy;
pub mod local;
pub mod spline;
pub mod vec;

pub use cartographic::*;
pub use ecef::*;
pub use geodesy::*;
pub use local::*;
pub use spline::*;
pub use vec::*;
