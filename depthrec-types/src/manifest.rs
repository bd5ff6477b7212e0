//! Session manifest schema.
//!
//! A session manifest is a single JSON object mapping fixed-precision
//! timestamp keys to [`MetadataRecord`]s, plus one synthetic `"FrameNum"`
//! entry carrying the session frame counter:
//!
//! ```json
//! {
//!   "12.345678": { "transformMat": ..., "eulrAngle": ..., "intrinsics": ..., "tracking_quality": 2 },
//!   "FrameNum": 42
//! }
//! ```

use crate::types::MetadataRecord;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// File name of the manifest inside a session root.
pub const MANIFEST_FILE_NAME: &str = "meta.json";

/// Manifest key holding the frame counter.
pub const FRAME_NUM_KEY: &str = "FrameNum";

/// Format a frame timestamp as the canonical manifest/filename key.
///
/// Fixed 6-decimal formatting: stable, sortable, and collision-free at any
/// realistic capture rate. The same key names the frame's artifacts on disk,
/// so it is the join key between manifest entries and image files.
pub fn timestamp_key(timestamp: f64) -> String {
    format!("{:.6}", timestamp)
}

/// All per-frame metadata for one recording session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionManifest {
    /// Per-frame records keyed by timestamp string.
    pub frames: BTreeMap<String, MetadataRecord>,
    /// Session frame counter at flush time.
    pub frame_num: u64,
}

impl SessionManifest {
    pub fn new(frames: BTreeMap<String, MetadataRecord>, frame_num: u64) -> Self {
        Self { frames, frame_num }
    }

    /// Serialize to the pretty-printed on-disk form.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a manifest from its on-disk form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Serialize for SessionManifest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.frames.len() + 1))?;
        for (key, record) in &self.frames {
            map.serialize_entry(key, record)?;
        }
        map.serialize_entry(FRAME_NUM_KEY, &self.frame_num)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for SessionManifest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ManifestVisitor;

        impl<'de> Visitor<'de> for ManifestVisitor {
            type Value = SessionManifest;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of timestamp keys plus a FrameNum entry")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut frames = BTreeMap::new();
                let mut frame_num = None;
                while let Some(key) = access.next_key::<String>()? {
                    if key == FRAME_NUM_KEY {
                        if frame_num.is_some() {
                            return Err(de::Error::duplicate_field(FRAME_NUM_KEY));
                        }
                        frame_num = Some(access.next_value::<u64>()?);
                    } else {
                        let record = access.next_value::<MetadataRecord>()?;
                        frames.insert(key, record);
                    }
                }
                let frame_num =
                    frame_num.ok_or_else(|| de::Error::missing_field(FRAME_NUM_KEY))?;
                Ok(SessionManifest { frames, frame_num })
            }
        }

        deserializer.deserialize_map(ManifestVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackingQuality;

    fn sample_record(seed: f32) -> MetadataRecord {
        MetadataRecord {
            transform_mat: [
                [1.0, 0.0, 0.0, seed],
                [0.0, 1.0, 0.0, seed * 2.0],
                [0.0, 0.0, 1.0, seed * 3.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            eulr_angle: [seed, -seed, 90.0],
            intrinsics: [
                [500.0, 0.0, 128.0],
                [0.0, 500.0, 96.0],
                [0.0, 0.0, 1.0],
            ],
            tracking_quality: TrackingQuality::Normal,
        }
    }

    #[test]
    fn test_timestamp_key_formatting() {
        assert_eq!(timestamp_key(0.1), "0.100000");
        assert_eq!(timestamp_key(12.3456789), "12.345679");
        assert_eq!(timestamp_key(0.0), "0.000000");
    }

    #[test]
    fn test_manifest_roundtrip() {
        let mut frames = BTreeMap::new();
        frames.insert(timestamp_key(1.5), sample_record(0.25));
        frames.insert(timestamp_key(1.6), sample_record(0.5));
        let manifest = SessionManifest::new(frames, 2);

        let json = manifest.to_json_pretty().unwrap();
        let parsed = SessionManifest::from_json(&json).unwrap();
        assert_eq!(parsed, manifest);
        assert_eq!(parsed.frame_num, 2);
        assert_eq!(parsed.frames.len(), 2);
    }

    #[test]
    fn test_manifest_json_shape() {
        let mut frames = BTreeMap::new();
        frames.insert(timestamp_key(3.0), sample_record(1.0));
        let manifest = SessionManifest::new(frames, 1);

        let value: serde_json::Value =
            serde_json::from_str(&manifest.to_json_pretty().unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object[FRAME_NUM_KEY], 1);
        assert!(object["3.000000"].is_object());
    }

    #[test]
    fn test_manifest_missing_frame_num_is_an_error() {
        assert!(SessionManifest::from_json("{}").is_err());
    }
}
