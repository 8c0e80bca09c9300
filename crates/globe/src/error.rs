use layers::ImageryError;
use recents::RecentsError;
use streaming::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlobeError {
    #[error(transparent)]
    Imagery(#[from] ImageryError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Recents(#[from] RecentsError),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("scene is no longer mounted")]
    Unmounted,
}

/// Why the host could not provide a device position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable")]
    Unavailable,
    #[error("location request timed out")]
    Timeout,
}
