//! Recorder configuration.
//!
//! Loaded from and saved to the platform-standard config directory
//! (`~/.config/depthrec/config.json` on Linux). Every field has a default
//! so a missing or partial file still yields a usable configuration.

use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for the recording pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Directory under which session directories are created.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Minimum interval between accepted frames, in seconds.
    /// The reciprocal is the target capture rate.
    #[serde(default = "default_min_frame_interval")]
    pub min_frame_interval: f64,
    /// JPEG quality for color artifacts (0-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Capacity of the per-session write queue.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    /// Number of concurrent encode/write workers per session.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

fn default_output_dir() -> PathBuf {
    // Prefer the user's Videos directory, falling back to home, then cwd
    if let Some(user_dirs) = UserDirs::new() {
        if let Some(videos) = user_dirs.video_dir() {
            return videos.join("depthrec");
        }
        return user_dirs.home_dir().join("depthrec");
    }
    PathBuf::from("depthrec")
}

fn default_min_frame_interval() -> f64 {
    // ~30 fps target
    1.0 / 30.0
}

fn default_jpeg_quality() -> u8 {
    crate::encoder::DEFAULT_JPEG_QUALITY
}

fn default_queue_depth() -> usize {
    30
}

fn default_worker_threads() -> usize {
    4
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            min_frame_interval: default_min_frame_interval(),
            jpeg_quality: default_jpeg_quality(),
            queue_depth: default_queue_depth(),
            worker_threads: default_worker_threads(),
        }
    }
}

impl RecorderConfig {
    /// Path of the config file in the platform config directory.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "depthrec").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Invalid config at {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist the configuration to the platform config directory.
    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path().ok_or("Could not determine config directory")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(&path, json).map_err(|e| e.to_string())
    }
}
