//! Shared types for recording sessions.

use serde::{Deserialize, Serialize};

/// Pose tracking quality reported by the frame source.
///
/// Serialized as an integer (0/1/2) to match the manifest schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TrackingQuality {
    /// Pose is not available
    Unavailable,
    /// Pose is available but degraded
    Limited,
    /// Pose is fully tracked
    Normal,
}

impl TrackingQuality {
    /// Short label for status display.
    pub fn label(&self) -> &'static str {
        match self {
            TrackingQuality::Unavailable => "unavailable",
            TrackingQuality::Limited => "limited",
            TrackingQuality::Normal => "normal",
        }
    }
}

impl From<TrackingQuality> for u8 {
    fn from(quality: TrackingQuality) -> Self {
        match quality {
            TrackingQuality::Unavailable => 0,
            TrackingQuality::Limited => 1,
            TrackingQuality::Normal => 2,
        }
    }
}

impl TryFrom<u8> for TrackingQuality {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TrackingQuality::Unavailable),
            1 => Ok(TrackingQuality::Limited),
            2 => Ok(TrackingQuality::Normal),
            other => Err(format!("invalid tracking quality: {}", other)),
        }
    }
}

/// Recording state enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// Not recording, ready to start
    Idle,
    /// Currently recording
    Recording,
}

/// Per-frame pose metadata as stored in the session manifest.
///
/// Field names match the on-disk manifest schema. Euler angles are in
/// degrees; the transform is a row-major camera-to-world matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// 4x4 pose transform (row-major, metric, world-aligned)
    #[serde(rename = "transformMat")]
    pub transform_mat: [[f32; 4]; 4],
    /// Euler angles in degrees
    #[serde(rename = "eulrAngle")]
    pub eulr_angle: [f32; 3],
    /// 3x3 camera intrinsics
    pub intrinsics: [[f32; 3]; 3],
    /// Tracking quality (0 = unavailable, 1 = limited, 2 = normal)
    pub tracking_quality: TrackingQuality,
}

impl MetadataRecord {
    /// Camera position extracted from the transform (translation column).
    pub fn position(&self) -> [f32; 3] {
        [
            self.transform_mat[0][3],
            self.transform_mat[1][3],
            self.transform_mat[2][3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_quality_roundtrip() {
        for quality in [
            TrackingQuality::Unavailable,
            TrackingQuality::Limited,
            TrackingQuality::Normal,
        ] {
            let raw = u8::from(quality);
            assert_eq!(TrackingQuality::try_from(raw).unwrap(), quality);
        }
        assert!(TrackingQuality::try_from(3).is_err());
    }

    #[test]
    fn test_tracking_quality_serializes_as_integer() {
        let json = serde_json::to_string(&TrackingQuality::Normal).unwrap();
        assert_eq!(json, "2");
    }

    #[test]
    fn test_metadata_record_field_names() {
        let record = MetadataRecord {
            transform_mat: [[0.0; 4]; 4],
            eulr_angle: [0.0; 3],
            intrinsics: [[0.0; 3]; 3],
            tracking_quality: TrackingQuality::Limited,
        };
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("transformMat"));
        assert!(object.contains_key("eulrAngle"));
        assert!(object.contains_key("intrinsics"));
        assert_eq!(object["tracking_quality"], 1);
    }
}
