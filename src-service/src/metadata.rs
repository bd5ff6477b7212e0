//! Per-session metadata accumulation and manifest flushing.
//!
//! Writers for different frames complete in arbitrary order, so the
//! accumulator is a timestamp-keyed map behind a mutex: inserts are
//! commutative and a key collision (which the rate gate makes practically
//! impossible) is last-write-wins rather than a crash.

use crate::error::FlushError;
use depthrec_types::{MetadataRecord, SessionManifest, MANIFEST_FILE_NAME};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Thread-safe, append-only store of per-frame metadata for one session.
#[derive(Debug, Default)]
pub struct MetadataAccumulator {
    entries: Mutex<BTreeMap<String, MetadataRecord>>,
}

impl MetadataAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its timestamp key.
    ///
    /// Safe under concurrent callers; last write wins on collision.
    pub fn append(&self, key: String, record: MetadataRecord) {
        let mut entries = self.entries.lock().unwrap();
        if entries.insert(key.clone(), record).is_some() {
            warn!("Duplicate timestamp key {}, keeping latest record", key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Flush accumulated metadata to `<root>/meta.json`.
    ///
    /// Snapshots the map plus the `FrameNum` counter, serializes it pretty
    /// printed, and writes it atomically: the manifest is staged in a temp
    /// file inside the session root and renamed over the target, so a crash
    /// mid-write never leaves a truncated manifest.
    ///
    /// Only the keys that made it into the written manifest are removed
    /// afterwards; records appended concurrently during the write, and the
    /// whole map on failure, are retained for a later retry.
    pub fn flush(&self, root: &Path, frame_num: u64) -> Result<PathBuf, FlushError> {
        let snapshot = self.entries.lock().unwrap().clone();
        let manifest = SessionManifest::new(snapshot, frame_num);
        let json = manifest.to_json_pretty().map_err(FlushError::Serialize)?;

        let target = root.join(MANIFEST_FILE_NAME);
        write_atomic(root, &target, json.as_bytes())?;

        let mut entries = self.entries.lock().unwrap();
        for key in manifest.frames.keys() {
            entries.remove(key);
        }
        Ok(target)
    }
}

/// Stage bytes in a temp file next to `target` and rename into place.
fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), FlushError> {
    let io_err = |source: std::io::Error| FlushError::Io {
        path: target.to_path_buf(),
        source,
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    staged.write_all(bytes).map_err(io_err)?;
    staged.persist(target).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depthrec_types::{timestamp_key, TrackingQuality};
    use std::sync::Arc;

    fn record(seed: f32) -> MetadataRecord {
        MetadataRecord {
            transform_mat: [
                [1.0, 0.0, 0.0, seed],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            eulr_angle: [seed, 0.0, 0.0],
            intrinsics: [[500.0, 0.0, 96.0], [0.0, 500.0, 72.0], [0.0, 0.0, 1.0]],
            tracking_quality: TrackingQuality::Normal,
        }
    }

    #[test]
    fn test_append_and_flush() {
        let dir = tempfile::tempdir().unwrap();
        let accumulator = MetadataAccumulator::new();
        accumulator.append(timestamp_key(0.1), record(1.0));
        accumulator.append(timestamp_key(0.2), record(2.0));
        assert_eq!(accumulator.len(), 2);

        let path = accumulator.flush(dir.path(), 2).unwrap();
        assert_eq!(path, dir.path().join(MANIFEST_FILE_NAME));
        assert!(accumulator.is_empty());

        let manifest =
            SessionManifest::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(manifest.frame_num, 2);
        assert_eq!(manifest.frames.len(), 2);
        assert_eq!(manifest.frames[&timestamp_key(0.1)], record(1.0));
    }

    #[test]
    fn test_key_collision_keeps_latest() {
        let accumulator = MetadataAccumulator::new();
        accumulator.append(timestamp_key(0.5), record(1.0));
        accumulator.append(timestamp_key(0.5), record(9.0));
        assert_eq!(accumulator.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        accumulator.flush(dir.path(), 1).unwrap();
        let manifest = SessionManifest::from_json(
            &std::fs::read_to_string(dir.path().join(MANIFEST_FILE_NAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest.frames[&timestamp_key(0.5)], record(9.0));
    }

    #[test]
    fn test_flush_failure_retains_entries() {
        let accumulator = MetadataAccumulator::new();
        accumulator.append(timestamp_key(0.1), record(1.0));

        let missing = Path::new("/nonexistent/depthrec-test");
        assert!(accumulator.flush(missing, 1).is_err());
        // Nothing was durably written, so nothing may be discarded
        assert_eq!(accumulator.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_lose_nothing() {
        let accumulator = Arc::new(MetadataAccumulator::new());
        let mut handles = Vec::new();
        for i in 0..100u32 {
            let accumulator = accumulator.clone();
            handles.push(tokio::spawn(async move {
                let ts = i as f64 * 0.033;
                accumulator.append(timestamp_key(ts), record(i as f32));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(accumulator.len(), 100);

        let dir = tempfile::tempdir().unwrap();
        accumulator.flush(dir.path(), 100).unwrap();
        let manifest = SessionManifest::from_json(
            &std::fs::read_to_string(dir.path().join(MANIFEST_FILE_NAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest.frames.len(), 100);
        assert_eq!(manifest.frame_num, 100);
    }
}
