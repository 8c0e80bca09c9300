//! Flood-monitoring globe: scene bootstrap plus the controllers that keep the
//! scene in step with host props.

pub mod alerts;
pub mod bootstrap;
pub mod config;
pub mod director;
pub mod error;
pub mod markers;
pub mod overlay;
pub mod props;
pub mod simulation;
pub mod view;

pub use bootstrap::SceneBootstrap;
pub use config::{GlobeConfig, HomeView};
pub use director::CameraIntent;
pub use error::{GeolocationError, GlobeError};
pub use props::GlobeProps;
pub use view::{GlobeServices, GlobeView};
