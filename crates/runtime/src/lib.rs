pub mod animation;
pub mod channel;
pub mod event_bus;
pub mod frame;
pub mod spawn;

pub use animation::*;
pub use event_bus::*;
pub use frame::*;
pub use spawn::*;
