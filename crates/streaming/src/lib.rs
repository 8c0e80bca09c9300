//! Data sources feeding the globe: simulation frames, flood extents and terrain.

pub mod error;
pub mod http;
pub mod mock;
pub mod request;
pub mod source;

pub use error::*;
pub use http::*;
pub use mock::*;
pub use request::*;
pub use source::*;
