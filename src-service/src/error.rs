//! Error types for the recording pipeline.
//!
//! Every failure here is local: it is logged, appended to the session
//! diagnostics, and processing continues for the remaining artifacts and
//! frames. Nothing in the pipeline is fatal to the process.

use crate::encoder::ArtifactKind;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// A session subdirectory could not be created.
///
/// A pre-existing directory is never an error; this covers genuine creation
/// failures (permissions, missing volume, ...).
#[derive(Debug)]
pub struct DirectoryCreateError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for DirectoryCreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to create directory {}: {}",
            self.path.display(),
            self.source
        )
    }
}

impl std::error::Error for DirectoryCreateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// One artifact of a frame could not be encoded.
#[derive(Debug)]
pub struct EncodeError {
    pub artifact: ArtifactKind,
    pub reason: String,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to encode {} artifact: {}", self.artifact, self.reason)
    }
}

impl std::error::Error for EncodeError {}

/// An encoded artifact could not be written to disk.
#[derive(Debug)]
pub struct WriteError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to write {}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// The session manifest could not be flushed.
///
/// Accumulated metadata is retained after a flush failure so a later flush
/// can retry; see the metadata accumulator.
#[derive(Debug)]
pub enum FlushError {
    /// Manifest serialization failed
    Serialize(serde_json::Error),
    /// Writing or renaming the manifest file failed
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for FlushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushError::Serialize(err) => write!(f, "Failed to serialize manifest: {}", err),
            FlushError::Io { path, source } => {
                write!(f, "Failed to write manifest {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for FlushError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlushError::Serialize(err) => Some(err),
            FlushError::Io { source, .. } => Some(source),
        }
    }
}

impl From<FlushError> for String {
    fn from(err: FlushError) -> Self {
        err.to_string()
    }
}
