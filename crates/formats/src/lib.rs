pub mod alert;
pub mod assets;
pub mod error;
pub mod geojson;
pub mod simulation;

pub use alert::*;
pub use error::*;
pub use geojson::*;
pub use simulation::*;
