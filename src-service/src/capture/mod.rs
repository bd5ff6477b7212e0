//! Frame source abstraction.
//!
//! The recording pipeline has no control over delivery timing or rate; a
//! [`FrameSource`] pushes frames through a bounded channel and the pipeline
//! consumes them. Sources that cannot supply depth or confidence buffers
//! leave those fields unset and the session degrades to color-only capture.

pub mod synthetic;
pub mod types;

pub use synthetic::{SyntheticConfig, SyntheticSource};
pub use types::{ColorImage, ConfidenceMap, DepthMap, FrameReceiver, SensorFrame, StopHandle};

use std::fmt;

/// Error type for frame source operations.
#[derive(Debug)]
pub enum CaptureError {
    /// The source could not be started
    SourceUnavailable(String),
    /// Invalid source parameters
    InvalidParameters(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::SourceUnavailable(msg) => write!(f, "Frame source unavailable: {}", msg),
            CaptureError::InvalidParameters(msg) => write!(f, "Invalid parameters: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<CaptureError> for String {
    fn from(err: CaptureError) -> Self {
        err.to_string()
    }
}

/// Trait for frame delivery backends.
pub trait FrameSource: Send + Sync {
    /// Start delivering frames.
    ///
    /// Returns a frame receiver and a stop handle; setting the stop handle
    /// ends delivery and closes the channel.
    fn start(&self) -> Result<(FrameReceiver, StopHandle), CaptureError>;
}
