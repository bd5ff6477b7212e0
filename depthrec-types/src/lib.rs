//! Depthrec Shared Types
//!
//! Serializable types shared between the recording service and its
//! observers: tracking quality, per-frame metadata records, recording
//! state, and the session manifest schema.

pub mod manifest;
pub mod types;

pub use manifest::{timestamp_key, SessionManifest, MANIFEST_FILE_NAME};
pub use types::*;
