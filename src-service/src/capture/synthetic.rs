//! Synthetic frame source for headless runs and tests.
//!
//! Generates procedurally shaded buffers and an orbiting camera pose at a
//! configurable rate. Delivery mirrors a real sensor backend: frames are
//! produced on a dedicated thread and pushed through a bounded channel with
//! `try_send`, dropping frames instead of blocking when the consumer lags.

use super::types::{ColorImage, ConfidenceMap, DepthMap, FrameReceiver, SensorFrame, StopHandle};
use super::{CaptureError, FrameSource};
use depthrec_types::TrackingQuality;
use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

/// Configuration for the synthetic source.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Delivery rate in frames per second
    pub fps: f64,
    /// Stop after this many frames (None = run until stopped)
    pub frame_limit: Option<u64>,
    /// Color image dimensions
    pub color_width: u32,
    pub color_height: u32,
    /// Depth/confidence map dimensions
    pub depth_width: u32,
    pub depth_height: u32,
    /// Whether to supply depth and confidence buffers
    pub with_depth: bool,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            frame_limit: None,
            color_width: 192,
            color_height: 144,
            // LiDAR-class depth resolution
            depth_width: 256,
            depth_height: 192,
            with_depth: true,
        }
    }
}

/// Frame source that fabricates frames on a producer thread.
pub struct SyntheticSource {
    config: SyntheticConfig,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }
}

impl FrameSource for SyntheticSource {
    fn start(&self) -> Result<(FrameReceiver, StopHandle), CaptureError> {
        if self.config.fps <= 0.0 {
            return Err(CaptureError::InvalidParameters(format!(
                "fps must be positive, got {}",
                self.config.fps
            )));
        }

        // Bounded to roughly one second of frames to cap memory growth
        let capacity = (self.config.fps.ceil() as usize).max(1);
        let (frame_tx, frame_rx) = mpsc::channel::<SensorFrame>(capacity);

        let stop_flag: StopHandle = Arc::new(AtomicBool::new(false));
        let stop = stop_flag.clone();
        let config = self.config.clone();

        std::thread::spawn(move || {
            let interval = Duration::from_secs_f64(1.0 / config.fps);
            let started = Instant::now();
            let mut produced: u64 = 0;

            loop {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                if let Some(limit) = config.frame_limit {
                    if produced >= limit {
                        break;
                    }
                }

                let timestamp = started.elapsed().as_secs_f64();
                let frame = make_frame(&config, produced, timestamp);
                produced += 1;

                // Don't block if the channel is full; drop the frame instead
                let _ = frame_tx.try_send(frame);

                std::thread::sleep(interval);
            }
            info!("Synthetic source stopped after {} frames", produced);
        });

        Ok((frame_rx, stop_flag))
    }
}

/// Fabricate one frame at the given sequence index.
fn make_frame(config: &SyntheticConfig, index: u64, timestamp: f64) -> SensorFrame {
    let phase = (index as f32) * 0.02;

    // Camera orbits the origin at 1 m radius, yaw following the orbit
    let x = phase.cos();
    let z = phase.sin();
    let yaw = phase;
    let transform = [
        [yaw.cos(), 0.0, yaw.sin(), x],
        [0.0, 1.0, 0.0, 0.0],
        [-yaw.sin(), 0.0, yaw.cos(), z],
        [0.0, 0.0, 0.0, 1.0],
    ];

    let (depth, confidence) = if config.with_depth {
        (
            Some(make_depth(config.depth_width, config.depth_height, phase)),
            Some(make_confidence(config.depth_width, config.depth_height)),
        )
    } else {
        (None, None)
    };

    SensorFrame {
        timestamp,
        color: make_color(config.color_width, config.color_height, phase),
        depth,
        confidence,
        transform,
        euler_angles: [0.0, wrap_angle(yaw), 0.0],
        intrinsics: [
            [500.0, 0.0, config.color_width as f32 / 2.0],
            [0.0, 500.0, config.color_height as f32 / 2.0],
            [0.0, 0.0, 1.0],
        ],
        tracking_quality: TrackingQuality::Normal,
    }
}

fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle % (2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

fn make_color(width: u32, height: u32, phase: f32) -> ColorImage {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    let shade = ((phase.sin() * 0.5 + 0.5) * 255.0) as u8;
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width.max(1)) as u8);
            data.push((y * 255 / height.max(1)) as u8);
            data.push(shade);
        }
    }
    ColorImage {
        width,
        height,
        data,
    }
}

fn make_depth(width: u32, height: u32, phase: f32) -> DepthMap {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let mut data = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let dx = (x as f32 - cx) / cx.max(1.0);
            let dy = (y as f32 - cy) / cy.max(1.0);
            // A gently breathing bowl of distances, 1-3 m
            data.push(1.0 + (dx * dx + dy * dy).sqrt() + phase.sin().abs());
        }
    }
    DepthMap {
        width,
        height,
        data,
    }
}

fn make_confidence(width: u32, height: u32) -> ConfidenceMap {
    // Full confidence everywhere; fine for a fabricated scene
    ConfidenceMap {
        width,
        height,
        data: vec![2u8; (width * height) as usize],
    }
}
