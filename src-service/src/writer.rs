//! Session directory layout and artifact writes.
//!
//! One writer per recording session. Artifacts land under `rgb/`, `depth/`
//! and `conf/` inside the session root, named `<timestamp key>.<ext>` with
//! the same key used by the metadata accumulator, so downstream tooling can
//! join images to manifest entries.

use crate::encoder::ArtifactKind;
use crate::error::{DirectoryCreateError, WriteError};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes one session's artifacts beneath a session root.
#[derive(Debug)]
pub struct SessionWriter {
    root: PathBuf,
}

impl SessionWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The session root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the session subdirectories.
    ///
    /// Idempotent: pre-existing directories are not errors. Creation
    /// failures are collected and reported; they never abort the frame.
    pub fn ensure_layout(&self) -> Vec<DirectoryCreateError> {
        let mut failures = Vec::new();
        for kind in [
            ArtifactKind::Color,
            ArtifactKind::Depth,
            ArtifactKind::Confidence,
        ] {
            let dir = self.root.join(kind.subdir());
            if let Err(source) = fs::create_dir_all(&dir) {
                failures.push(DirectoryCreateError { path: dir, source });
            }
        }
        failures
    }

    /// Path of an artifact for the given timestamp key.
    pub fn artifact_path(&self, kind: ArtifactKind, key: &str) -> PathBuf {
        self.root
            .join(kind.subdir())
            .join(format!("{}.{}", key, kind.extension()))
    }

    /// Write one encoded artifact.
    ///
    /// `None` bytes (the artifact was missing or failed to encode) is a
    /// no-op. Returns the written path on success.
    pub fn write_artifact(
        &self,
        kind: ArtifactKind,
        key: &str,
        bytes: Option<&[u8]>,
    ) -> Result<Option<PathBuf>, WriteError> {
        let Some(bytes) = bytes else {
            return Ok(None);
        };
        let path = self.artifact_path(kind, key);
        fs::write(&path, bytes).map_err(|source| WriteError {
            path: path.clone(),
            source,
        })?;
        Ok(Some(path))
    }
}
