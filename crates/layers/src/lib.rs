pub mod imagery;
pub mod placeholder;
pub mod symbology;
pub mod terrain;
pub mod vector;

pub use imagery::*;
