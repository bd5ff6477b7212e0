//! Live status rendering.
//!
//! Pure functions of the current frame and session state: a UI layer only
//! ever observes the produced string. Recomputed on every frame whether or
//! not a recording is active.

use crate::capture::types::SensorFrame;
use std::f32::consts::PI;
use std::sync::Mutex;

/// Status while a session is recording.
///
/// `previous` is the last accepted frame's timestamp, so the FPS estimate
/// measures capture cadence rather than delivery rate; it is 0 for the
/// first frame or a non-advancing clock.
pub fn recording_status(frame: &SensorFrame, frame_count: u64, previous: Option<f64>) -> String {
    let fps = match previous {
        Some(prev) if frame.timestamp > prev => (1.0 / (frame.timestamp - prev)) as i64,
        _ => 0,
    };
    format!(
        "FPS: {} | Frames: {} | Tracking: {}\n{}",
        fps,
        frame_count,
        frame.tracking_quality.label(),
        pose_line(frame)
    )
}

/// Status while idle.
pub fn idle_status(frame: &SensorFrame) -> String {
    let mut status = String::from("Ready to record >>>\n");
    if frame.depth.is_none() {
        status.push_str("Depth data unavailable on this device\n");
    }
    status.push_str(&pose_line(frame));
    status.push_str(&format!(" | Tracking: {}", frame.tracking_quality.label()));
    status
}

/// Euler angles (degrees, truncated) and position (meters, 2-decimal).
fn pose_line(frame: &SensorFrame) -> String {
    let [rx, ry, rz] = frame.euler_angles.map(|r| (r / PI * 180.0) as i32);
    let [px, py, pz] = frame.position();
    format!(
        "X: {:4}, Y: {:4}, Z: {:4} | X: {:.2}, Y: {:.2}, Z: {:.2}",
        rx, ry, rz, px, py, pz
    )
}

/// Append-only collection of failure notes for the active session.
///
/// Encode, write and flush failures land here and surface through the
/// status string; they never abort the session.
#[derive(Debug, Default)]
pub struct Diagnostics {
    line: Mutex<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one failure note.
    pub fn append(&self, note: &str) {
        let mut line = self.line.lock().unwrap();
        line.push_str(note);
        line.push(';');
    }

    pub fn is_empty(&self) -> bool {
        self.line.lock().unwrap().is_empty()
    }

    pub fn snapshot(&self) -> String {
        self.line.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.line.lock().unwrap().clear();
    }
}
