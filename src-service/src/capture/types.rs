//! Runtime types for frame delivery (service-internal).
//!
//! These types carry raw sensor buffers and are not serializable; the
//! serializable manifest types live in depthrec-types.

use depthrec_types::TrackingQuality;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::mpsc;

/// An RGB8 color image buffer.
#[derive(Debug, Clone)]
pub struct ColorImage {
    pub width: u32,
    pub height: u32,
    /// Interleaved RGB8 pixel data
    pub data: Vec<u8>,
}

/// A dense depth map of metric distances.
#[derive(Debug, Clone)]
pub struct DepthMap {
    pub width: u32,
    pub height: u32,
    /// Row-major f32 distances in meters
    pub data: Vec<f32>,
}

/// A per-pixel depth confidence map.
///
/// Shares the depth map's dimensions.
#[derive(Debug, Clone)]
pub struct ConfidenceMap {
    pub width: u32,
    pub height: u32,
    /// Row-major 8-bit confidence values
    pub data: Vec<u8>,
}

/// One timestamped sensor frame as delivered by a frame source.
#[derive(Debug, Clone)]
pub struct SensorFrame {
    /// Monotonic capture time in seconds
    pub timestamp: f64,
    pub color: ColorImage,
    /// None on devices without a depth sensor
    pub depth: Option<DepthMap>,
    /// None when the source reports no confidence data
    pub confidence: Option<ConfidenceMap>,
    /// 4x4 camera-to-world transform (row-major, metric)
    pub transform: [[f32; 4]; 4],
    /// Euler angles in radians
    pub euler_angles: [f32; 3],
    /// 3x3 camera intrinsics
    pub intrinsics: [[f32; 3]; 3],
    pub tracking_quality: TrackingQuality,
}

impl SensorFrame {
    /// Camera position (translation column of the transform).
    pub fn position(&self) -> [f32; 3] {
        [
            self.transform[0][3],
            self.transform[1][3],
            self.transform[2][3],
        ]
    }
}

/// Handle to stop an ongoing capture.
pub type StopHandle = Arc<AtomicBool>;

/// Receiver for delivered frames.
pub type FrameReceiver = mpsc::Receiver<SensorFrame>;
