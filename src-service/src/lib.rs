//! Depthrec Recording Service
//!
//! The frame-recording pipeline: an external frame source delivers
//! timestamped RGB-D sensor frames, and the [`state::RecordingManager`]
//! gates them to a target capture rate, encodes and writes each accepted
//! frame's artifacts off the arrival path, accumulates per-frame pose
//! metadata, and flushes a single `meta.json` manifest when the session
//! ends.

pub mod capture;
pub mod config;
pub mod encoder;
pub mod error;
pub mod gate;
pub mod metadata;
pub mod state;
pub mod status;
pub mod writer;

pub use capture::{FrameReceiver, FrameSource, SensorFrame, StopHandle};
pub use config::RecorderConfig;
pub use state::{RecordingManager, SessionEvent};

use std::sync::Arc;

/// Pump frames from a receiver into the manager until the source closes.
///
/// This is the glue between a [`FrameSource`] and the state machine; the
/// manager itself never blocks on I/O inside `on_frame`.
pub async fn drive(manager: Arc<RecordingManager>, mut frames: FrameReceiver) {
    while let Some(frame) = frames.recv().await {
        manager.on_frame(frame).await;
    }
}
