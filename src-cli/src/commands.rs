//! CLI command implementations.

use crate::colors;
use crate::exit_codes::ExitCode;
use crate::RecordOptions;
use depthrec_service::capture::{FrameSource, SyntheticConfig, SyntheticSource};
use depthrec_service::{drive, RecorderConfig, RecordingManager, SessionEvent};
use depthrec_types::{RecordingState, SessionManifest, MANIFEST_FILE_NAME};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};

/// Record a session from the built-in synthetic source.
///
/// Runs until Ctrl+C, the frame cap, or the duration limit, whichever
/// comes first, then reports the written manifest.
pub async fn record(options: RecordOptions, json: bool, quiet: bool, verbose: bool) -> ExitCode {
    let mut config = RecorderConfig::load();
    if let Some(dir) = &options.output {
        config.output_dir = dir.clone();
    }
    if let Some(rate) = options.rate {
        if rate <= 0.0 {
            eprintln!("{}", colors::error("--rate must be positive"));
            return ExitCode::InvalidArguments;
        }
        config.min_frame_interval = 1.0 / rate;
    }
    if let Some(interval) = options.interval {
        if interval < 0.0 {
            eprintln!("{}", colors::error("--interval must not be negative"));
            return ExitCode::InvalidArguments;
        }
        config.min_frame_interval = interval;
    }
    let output_dir = config.output_dir.clone();

    let manager = Arc::new(RecordingManager::new(config));
    let mut events = manager.subscribe();

    let source = SyntheticSource::new(SyntheticConfig {
        fps: options.source_fps,
        with_depth: !options.no_depth,
        ..Default::default()
    });
    let (frames, stop) = match source.start() {
        Ok(started) => started,
        Err(e) => {
            eprintln!("{}", colors::error(&e.to_string()));
            return ExitCode::SourceFailed;
        }
    };

    let session_id = match manager.start_recording(options.frames).await {
        Ok(id) => id,
        Err(e) => {
            stop.store(true, Ordering::SeqCst);
            eprintln!("{}", colors::error(&e));
            return ExitCode::RecordingFailedToStart;
        }
    };
    if !quiet && !json {
        println!(
            "{} {}",
            colors::recording("Recording"),
            colors::path(&output_dir.join(&session_id).display().to_string())
        );
        println!("{}", colors::dim("Press Ctrl+C to stop"));
    }

    let pump = tokio::spawn(drive(manager.clone(), frames));

    let deadline = options
        .duration
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut manifest: Option<PathBuf> = None;
    let mut save_failed = false;
    // The frame cap stops the session from inside the pipeline; wait for
    // the manifest (or its failure) before declaring the run finished.
    let mut capped = false;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(SessionEvent::ManifestWritten { path, .. }) => {
                    manifest = Some(path);
                    break;
                }
                Ok(SessionEvent::StateChanged(RecordingState::Idle)) => capped = true,
                Ok(SessionEvent::Failure(msg)) => {
                    if capped {
                        eprintln!("{}", colors::error(&msg));
                        save_failed = true;
                        break;
                    }
                    if verbose && !json {
                        eprintln!("{}", colors::warning(&msg));
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = ticker.tick() => {
                if verbose && !json {
                    let status = manager.status().await;
                    if !status.is_empty() {
                        println!("{}", colors::dim(&status.replace('\n', " | ")));
                    }
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    break;
                }
            }
        }
    }

    stop.store(true, Ordering::SeqCst);
    if manager.get_state().await == RecordingState::Recording {
        match manager.stop_recording().await {
            Ok(saved) => {
                manifest = saved;
                if manifest.is_none() && drain_failure(&mut events).is_some() {
                    save_failed = true;
                }
            }
            Err(e) => {
                eprintln!("{}", colors::error(&e));
                save_failed = true;
            }
        }
    }
    let _ = pump.await;

    match manifest {
        Some(path) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "session": session_id,
                        "manifest": path.display().to_string(),
                    })
                );
            } else if !quiet {
                println!(
                    "{} {}",
                    colors::success("Saved"),
                    colors::path(&path.display().to_string())
                );
            }
            ExitCode::Success
        }
        None if save_failed => {
            eprintln!(
                "{}",
                colors::error("Session metadata retained; manifest was not written")
            );
            ExitCode::SaveFailed
        }
        None => {
            if !quiet && !json {
                println!("{}", colors::dim("No frames recorded"));
            }
            ExitCode::Success
        }
    }
}

/// Pull any failure notification left in the event queue.
fn drain_failure(events: &mut broadcast::Receiver<SessionEvent>) -> Option<String> {
    loop {
        match events.try_recv() {
            Ok(SessionEvent::Failure(msg)) => return Some(msg),
            Ok(_) => continue,
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => return None,
        }
    }
}

/// Summarize a recorded session directory.
pub fn inspect(session: PathBuf, json: bool, quiet: bool) -> ExitCode {
    let (root, manifest_path) = if session.is_dir() {
        (session.clone(), session.join(MANIFEST_FILE_NAME))
    } else {
        let root = session.parent().map(Path::to_path_buf).unwrap_or_default();
        (root, session)
    };

    let contents = match std::fs::read_to_string(&manifest_path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!(
                "{}",
                colors::error(&format!("Cannot read {}: {}", manifest_path.display(), e))
            );
            return ExitCode::GeneralError;
        }
    };
    let manifest = match SessionManifest::from_json(&contents) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!("{}", colors::error(&format!("Invalid manifest: {}", e)));
            return ExitCode::GeneralError;
        }
    };

    let artifact_count = |subdir: &str| {
        std::fs::read_dir(root.join(subdir))
            .map(|entries| entries.count())
            .unwrap_or(0)
    };
    let (rgb, depth, conf) = (
        artifact_count("rgb"),
        artifact_count("depth"),
        artifact_count("conf"),
    );
    let first = manifest.frames.keys().next().cloned();
    let last = manifest.frames.keys().next_back().cloned();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "manifest": manifest_path.display().to_string(),
                "frame_num": manifest.frame_num,
                "entries": manifest.frames.len(),
                "first": first,
                "last": last,
                "rgb": rgb,
                "depth": depth,
                "conf": conf,
            })
        );
    } else {
        println!("{}", colors::header("Session"));
        println!(
            "  Manifest:  {}",
            colors::path(&manifest_path.display().to_string())
        );
        println!(
            "  FrameNum:  {}",
            colors::number(&manifest.frame_num.to_string())
        );
        println!(
            "  Entries:   {}",
            colors::number(&manifest.frames.len().to_string())
        );
        if let (Some(first), Some(last)) = (first.as_ref(), last.as_ref()) {
            println!("  Range:     {} .. {}", first, last);
        }
        println!("  Artifacts: rgb {} | depth {} | conf {}", rgb, depth, conf);
    }

    if manifest.frame_num as usize != manifest.frames.len() && !quiet {
        eprintln!(
            "{}",
            colors::warning(&format!(
                "FrameNum {} does not match {} manifest entries",
                manifest.frame_num,
                manifest.frames.len()
            ))
        );
    }
    ExitCode::Success
}

/// Show the effective configuration.
pub fn config(json: bool) {
    let config = RecorderConfig::load();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).unwrap_or_default()
        );
        return;
    }
    if let Some(path) = RecorderConfig::config_path() {
        println!(
            "{} {}",
            colors::header("Config file:"),
            colors::path(&path.display().to_string())
        );
    }
    println!("  output_dir:          {}", config.output_dir.display());
    println!(
        "  min_frame_interval:  {} ({:.0} fps)",
        config.min_frame_interval,
        1.0 / config.min_frame_interval
    );
    println!("  jpeg_quality:        {}", config.jpeg_quality);
    println!("  queue_depth:         {}", config.queue_depth);
    println!("  worker_threads:      {}", config.worker_threads);
}

/// Show version information.
pub fn version(json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "name": "depthrec",
                "version": env!("CARGO_PKG_VERSION"),
            })
        );
    } else {
        println!("depthrec {}", env!("CARGO_PKG_VERSION"));
    }
}
