//! Recording session state machine.
//!
//! This module manages the recording lifecycle:
//! - Recording state (idle, recording) and transitions
//! - Frame-rate gating and non-blocking dispatch of accepted frames
//! - Per-session worker pool for encode + write work
//! - Manifest flushing when a session ends
//! - Event broadcasting to subscribed observers
//!
//! The frame-arrival callback (`on_frame`) never blocks on I/O: accepted
//! frames are handed to a bounded job queue consumed by a fixed pool of
//! workers, and a full queue drops the frame rather than stalling the
//! producer.

use crate::capture::types::SensorFrame;
use crate::config::RecorderConfig;
use crate::encoder::{self, ArtifactKind};
use crate::gate;
use crate::metadata::MetadataAccumulator;
use crate::status::{self, Diagnostics};
use crate::writer::SessionWriter;
use chrono::Local;
use depthrec_types::{timestamp_key, MetadataRecord, RecordingState};
use std::f32::consts::PI;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tracing::{error, info, warn};

/// Events broadcast to subscribed observers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Recording state changed
    StateChanged(RecordingState),
    /// A session manifest was written
    ManifestWritten { path: PathBuf, frame_num: u64 },
    /// A non-fatal pipeline failure (also appended to the status string)
    Failure(String),
}

/// State owned exclusively by the active session.
struct ActiveSession {
    id: String,
    /// Frames fully processed by the worker pool
    frame_count: Arc<AtomicU64>,
    /// Stop automatically once this many frames are processed
    frame_cap: Option<u64>,
    /// Jobs handed to the pool so far; caps dispatch so the counter
    /// reaches the frame cap exactly
    dispatched: u64,
    /// Gate clock: timestamp of the last accepted frame, also the FPS
    /// reference in the status line
    last_accepted: Option<f64>,
    job_tx: mpsc::Sender<SensorFrame>,
    workers: Vec<tokio::task::JoinHandle<()>>,
    writer: Arc<SessionWriter>,
    metadata: Arc<MetadataAccumulator>,
}

/// A finished session whose manifest has not been durably written yet.
///
/// Kept for retry instead of discarding metadata on flush failure; also
/// holds records appended by writes that completed after stop.
struct PendingFlush {
    root: PathBuf,
    frame_count: Arc<AtomicU64>,
    metadata: Arc<MetadataAccumulator>,
}

/// Everything a worker needs to process one session's jobs.
#[derive(Clone)]
struct WorkerContext {
    writer: Arc<SessionWriter>,
    metadata: Arc<MetadataAccumulator>,
    frame_count: Arc<AtomicU64>,
    frame_cap: Option<u64>,
    diagnostics: Arc<Diagnostics>,
    event_tx: broadcast::Sender<SessionEvent>,
    jpeg_quality: u8,
}

/// Recording state manager: owns the session lifecycle.
pub struct RecordingManager {
    config: RecorderConfig,
    state: RwLock<RecordingState>,
    session: Mutex<Option<ActiveSession>>,
    /// Finished sessions whose manifests still need a successful flush
    pending: Mutex<Vec<PendingFlush>>,
    diagnostics: Arc<Diagnostics>,
    status: RwLock<String>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl RecordingManager {
    pub fn new(config: RecorderConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            config,
            state: RwLock::new(RecordingState::Idle),
            session: Mutex::new(None),
            pending: Mutex::new(Vec::new()),
            diagnostics: Arc::new(Diagnostics::new()),
            status: RwLock::new(String::new()),
            event_tx,
        }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Get the current recording state.
    pub async fn get_state(&self) -> RecordingState {
        *self.state.read().await
    }

    /// The latest status string (recomputed on every delivered frame).
    pub async fn status(&self) -> String {
        self.status.read().await.clone()
    }

    /// Broadcast an event to all subscribers.
    fn broadcast(&self, event: SessionEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.event_tx.send(event);
    }

    /// Set the recording state and broadcast the change.
    async fn set_state(&self, new_state: RecordingState) {
        {
            let mut state = self.state.write().await;
            *state = new_state;
        }
        self.broadcast(SessionEvent::StateChanged(new_state));
    }

    /// Check that we're in idle state.
    async fn check_idle(&self) -> Result<(), String> {
        let state = self.state.read().await;
        if *state != RecordingState::Idle {
            return Err("Already recording".to_string());
        }
        Ok(())
    }

    /// Start a recording session.
    ///
    /// Only valid while idle. Any previous session's unflushed metadata is
    /// flushed first so sessions never mix. Returns the session identifier.
    pub async fn start_recording(
        self: &Arc<Self>,
        frame_cap: Option<u64>,
    ) -> Result<String, String> {
        self.check_idle().await?;
        self.flush_pending().await;
        self.diagnostics.clear();

        let id = Local::now().format("%Y%m%d-%H%M%S%.3f").to_string();
        let writer = Arc::new(SessionWriter::new(self.config.output_dir.join(&id)));
        let metadata = Arc::new(MetadataAccumulator::new());
        let frame_count = Arc::new(AtomicU64::new(0));

        let (job_tx, job_rx) = mpsc::channel::<SensorFrame>(self.config.queue_depth.max(1));
        let job_rx = Arc::new(Mutex::new(job_rx));

        let context = WorkerContext {
            writer: writer.clone(),
            metadata: metadata.clone(),
            frame_count: frame_count.clone(),
            frame_cap,
            diagnostics: self.diagnostics.clone(),
            event_tx: self.event_tx.clone(),
            jpeg_quality: self.config.jpeg_quality,
        };
        let workers = (0..self.config.worker_threads.max(1))
            .map(|_| {
                tokio::spawn(run_worker(
                    context.clone(),
                    job_rx.clone(),
                    Arc::downgrade(self),
                ))
            })
            .collect();

        {
            let mut session = self.session.lock().await;
            *session = Some(ActiveSession {
                id: id.clone(),
                frame_count,
                frame_cap,
                dispatched: 0,
                last_accepted: None,
                job_tx,
                workers,
                writer,
                metadata,
            });
        }
        self.set_state(RecordingState::Recording).await;
        info!("Recording session {} started (cap: {:?})", id, frame_cap);
        Ok(id)
    }

    /// Handle one delivered frame.
    ///
    /// While recording: recompute the status, apply the rate gate and, on
    /// acceptance, dispatch the encode/write work to the pool without
    /// blocking. While idle: retry any pending manifest flush and recompute
    /// the status from the live frame.
    pub async fn on_frame(&self, frame: SensorFrame) {
        let state = *self.state.read().await;
        match state {
            RecordingState::Recording => {
                let mut guard = self.session.lock().await;
                let line = match guard.as_mut() {
                    Some(session) => {
                        // FPS in the status measures capture cadence: the
                        // interval since the last accepted frame
                        let line = status::recording_status(
                            &frame,
                            session.frame_count.load(Ordering::Relaxed),
                            session.last_accepted,
                        );

                        let cap_open =
                            session.frame_cap.map_or(true, |cap| session.dispatched < cap);
                        if cap_open
                            && gate::accept(
                                frame.timestamp,
                                session.last_accepted,
                                self.config.min_frame_interval,
                            )
                        {
                            // Update the gate clock before dispatch so it
                            // measures arrival cadence, not completion rate
                            session.last_accepted = Some(frame.timestamp);
                            match session.job_tx.try_send(frame) {
                                Ok(()) => session.dispatched += 1,
                                Err(mpsc::error::TrySendError::Full(_)) => {
                                    warn!("Write queue full, dropping frame");
                                    self.diagnostics.append("Write queue full, frame dropped");
                                }
                                Err(mpsc::error::TrySendError::Closed(_)) => {}
                            }
                        }
                        Some(line)
                    }
                    None => None,
                };
                drop(guard);
                if let Some(line) = line {
                    self.publish_status(line).await;
                }
            }
            RecordingState::Idle => {
                // Covers metadata appended by writes that outlived a stop,
                // and manifests whose flush previously failed
                self.flush_pending().await;
                let line = status::idle_status(&frame);
                self.publish_status(line).await;
            }
        }
    }

    /// Stop the current recording and write the session manifest.
    ///
    /// Closes the job queue, lets in-flight writes finish (their metadata is
    /// included), then flushes. An empty session is destroyed without a
    /// flush attempt; a failed flush parks the metadata for retry.
    pub async fn stop_recording(&self) -> Result<Option<PathBuf>, String> {
        {
            let state = self.state.read().await;
            if *state != RecordingState::Recording {
                return Err("Not currently recording".to_string());
            }
        }

        let session = self.session.lock().await.take();
        self.set_state(RecordingState::Idle).await;
        let Some(session) = session else {
            return Ok(None);
        };
        let ActiveSession {
            id,
            frame_count,
            job_tx,
            workers,
            writer,
            metadata,
            ..
        } = session;

        // Close the queue and drain the pool; no cancellation of accepted work
        drop(job_tx);
        for worker in workers {
            if let Err(e) = worker.await {
                error!("Frame worker task failed: {}", e);
            }
        }

        if metadata.is_empty() {
            info!("Recording session {} ended with no frames", id);
            return Ok(None);
        }

        let frame_num = frame_count.load(Ordering::SeqCst);
        let root = writer.root().to_path_buf();
        let flush_metadata = metadata.clone();
        let flush_root = root.clone();
        let result =
            tokio::task::spawn_blocking(move || flush_metadata.flush(&flush_root, frame_num))
                .await
                .map_err(|e| format!("Manifest flush task failed: {}", e))?;

        match result {
            Ok(path) => {
                info!(
                    "Recording session {} saved: {} ({} frames)",
                    id,
                    path.display(),
                    frame_num
                );
                self.broadcast(SessionEvent::ManifestWritten {
                    path: path.clone(),
                    frame_num,
                });
                Ok(Some(path))
            }
            Err(err) => {
                error!("Manifest flush for session {} failed: {}", id, err);
                self.diagnostics.append("Save manifest failed");
                self.broadcast(SessionEvent::Failure(err.to_string()));
                // Parked alongside any earlier failed sessions; each is
                // retried on the next idle tick or session start
                self.pending.lock().await.push(PendingFlush {
                    root,
                    frame_count,
                    metadata,
                });
                Ok(None)
            }
        }
    }

    /// Retry parked manifest flushes; whatever still fails stays parked.
    async fn flush_pending(&self) {
        let parked = std::mem::take(&mut *self.pending.lock().await);
        if parked.is_empty() {
            return;
        }

        let mut retained = Vec::new();
        for entry in parked {
            if entry.metadata.is_empty() {
                continue;
            }
            let frame_num = entry.frame_count.load(Ordering::SeqCst);
            let metadata = entry.metadata.clone();
            let root = entry.root.clone();
            let result =
                tokio::task::spawn_blocking(move || metadata.flush(&root, frame_num)).await;

            match result {
                Ok(Ok(path)) => {
                    info!("Deferred manifest written: {}", path.display());
                    self.broadcast(SessionEvent::ManifestWritten { path, frame_num });
                }
                Ok(Err(err)) => {
                    warn!("Deferred manifest flush failed, will retry: {}", err);
                    self.broadcast(SessionEvent::Failure(err.to_string()));
                    retained.push(entry);
                }
                Err(e) => {
                    error!("Manifest flush task failed: {}", e);
                    retained.push(entry);
                }
            }
        }
        if !retained.is_empty() {
            // Sessions stopped while we were retrying stay parked too
            self.pending.lock().await.append(&mut retained);
        }
    }

    /// Publish the latest status line, with any accumulated failure notes.
    async fn publish_status(&self, line: String) {
        let composed = if self.diagnostics.is_empty() {
            line
        } else {
            format!("{}\n{}", line, self.diagnostics.snapshot())
        };
        let mut status = self.status.write().await;
        *status = composed;
    }
}

/// One worker of the session pool: pulls jobs until the queue closes.
async fn run_worker(
    context: WorkerContext,
    jobs: Arc<Mutex<mpsc::Receiver<SensorFrame>>>,
    manager: Weak<RecordingManager>,
) {
    loop {
        let frame = { jobs.lock().await.recv().await };
        let Some(frame) = frame else {
            break;
        };

        let writer = context.writer.clone();
        let metadata = context.metadata.clone();
        let jpeg_quality = context.jpeg_quality;
        let outcome =
            tokio::task::spawn_blocking(move || process_frame(&writer, &metadata, frame, jpeg_quality))
                .await;

        let failures = match outcome {
            Ok(failures) => failures,
            Err(e) => {
                error!("Frame processing task failed: {}", e);
                continue;
            }
        };
        for note in failures {
            context.diagnostics.append(&note);
            let _ = context.event_tx.send(SessionEvent::Failure(note));
        }

        let count = context.frame_count.fetch_add(1, Ordering::SeqCst) + 1;
        if context.frame_cap == Some(count) {
            info!("Frame cap {} reached, stopping session", count);
            if let Some(manager) = manager.upgrade() {
                tokio::spawn(async move {
                    if let Err(e) = manager.stop_recording().await {
                        warn!("Auto-stop at frame cap failed: {}", e);
                    }
                });
            }
        }
    }
}

/// Process one accepted frame: directories, encode, write, metadata.
///
/// Runs on the blocking pool. Every failure is collected and reported;
/// none aborts the frame, and the metadata record is appended regardless
/// of individual artifact failures.
fn process_frame(
    writer: &SessionWriter,
    metadata: &MetadataAccumulator,
    frame: SensorFrame,
    jpeg_quality: u8,
) -> Vec<String> {
    let mut failures = Vec::new();
    let key = timestamp_key(frame.timestamp);

    for err in writer.ensure_layout() {
        warn!("{}", err);
        failures.push(err.to_string());
    }

    let (encoded, encode_errors) = encoder::encode_frame(&frame, jpeg_quality);
    for err in encode_errors {
        warn!("{}", err);
        failures.push(err.to_string());
    }

    for (kind, bytes) in [
        (ArtifactKind::Color, encoded.color.as_deref()),
        (ArtifactKind::Depth, encoded.depth.as_deref()),
        (ArtifactKind::Confidence, encoded.confidence.as_deref()),
    ] {
        if let Err(err) = writer.write_artifact(kind, &key, bytes) {
            warn!("{}", err);
            failures.push(err.to_string());
        }
    }

    let record = MetadataRecord {
        transform_mat: frame.transform,
        eulr_angle: frame.euler_angles.map(|r| r / PI * 180.0),
        intrinsics: frame.intrinsics,
        tracking_quality: frame.tracking_quality,
    };
    metadata.append(key, record);

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::types::{ColorImage, ConfidenceMap, DepthMap};
    use depthrec_types::{SessionManifest, TrackingQuality, MANIFEST_FILE_NAME};
    use std::path::Path;
    use std::time::Duration;

    fn test_config(output_dir: &Path) -> RecorderConfig {
        RecorderConfig {
            output_dir: output_dir.to_path_buf(),
            min_frame_interval: 0.01,
            jpeg_quality: 75,
            queue_depth: 30,
            worker_threads: 2,
        }
    }

    fn make_frame(timestamp: f64) -> SensorFrame {
        SensorFrame {
            timestamp,
            color: ColorImage {
                width: 4,
                height: 4,
                data: vec![64u8; 4 * 4 * 3],
            },
            depth: Some(DepthMap {
                width: 4,
                height: 4,
                data: vec![2.0f32; 16],
            }),
            confidence: Some(ConfidenceMap {
                width: 4,
                height: 4,
                data: vec![2u8; 16],
            }),
            transform: [
                [1.0, 0.0, 0.0, 0.1],
                [0.0, 1.0, 0.0, 0.2],
                [0.0, 0.0, 1.0, 0.3],
                [0.0, 0.0, 0.0, 1.0],
            ],
            euler_angles: [0.0, PI / 2.0, 0.0],
            intrinsics: [[500.0, 0.0, 2.0], [0.0, 500.0, 2.0], [0.0, 0.0, 1.0]],
            tracking_quality: TrackingQuality::Normal,
        }
    }

    fn read_manifest(root: &Path) -> SessionManifest {
        let json = std::fs::read_to_string(root.join(MANIFEST_FILE_NAME)).unwrap();
        SessionManifest::from_json(&json).unwrap()
    }

    async fn wait_for_manifest(root: &Path) {
        for _ in 0..200 {
            if root.join(MANIFEST_FILE_NAME).exists() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("manifest was not written at {}", root.display());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_record_and_stop_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(RecordingManager::new(test_config(dir.path())));

        let id = manager.start_recording(None).await.unwrap();
        for i in 0..5 {
            manager.on_frame(make_frame(i as f64 * 0.1)).await;
        }
        let path = manager.stop_recording().await.unwrap().unwrap();

        assert_eq!(manager.get_state().await, RecordingState::Idle);
        let root = dir.path().join(&id);
        assert_eq!(path, root.join(MANIFEST_FILE_NAME));

        let manifest = read_manifest(&root);
        assert_eq!(manifest.frame_num, 5);
        assert_eq!(manifest.frames.len(), 5);
        for subdir in ["rgb", "depth", "conf"] {
            let files = std::fs::read_dir(root.join(subdir)).unwrap().count();
            assert_eq!(files, 5, "expected 5 files in {}", subdir);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_gate_throttles_acceptance() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.min_frame_interval = 0.15;
        let manager = Arc::new(RecordingManager::new(config));

        let id = manager.start_recording(None).await.unwrap();
        for ts in [0.0, 0.1, 0.2, 0.3] {
            manager.on_frame(make_frame(ts)).await;
        }
        manager.stop_recording().await.unwrap().unwrap();

        // 0.0 accepted, 0.1 rejected, 0.2 accepted, 0.3 rejected
        let manifest = read_manifest(&dir.path().join(&id));
        assert_eq!(manifest.frame_num, 2);
        assert!(manifest.frames.contains_key("0.000000"));
        assert!(manifest.frames.contains_key("0.200000"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_frame_cap_stops_exactly_at_cap() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(RecordingManager::new(test_config(dir.path())));

        let id = manager.start_recording(Some(3)).await.unwrap();
        for i in 0..10 {
            manager.on_frame(make_frame(i as f64 * 0.1)).await;
        }
        // The cap stops the session from inside the pipeline
        wait_for_manifest(&dir.path().join(&id)).await;
        assert_eq!(manager.get_state().await, RecordingState::Idle);

        let manifest = read_manifest(&dir.path().join(&id));
        assert_eq!(manifest.frame_num, 3);
        assert_eq!(manifest.frames.len(), 3);

        // Idle frames are status-only passes; a new session can start
        manager.on_frame(make_frame(99.0)).await;
        assert!(manager.status().await.starts_with("Ready to record"));
        let second = manager.start_recording(None).await.unwrap();
        assert_ne!(second, id);
        manager.on_frame(make_frame(100.0)).await;
        manager.stop_recording().await.unwrap().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_empty_session_destroyed_without_flush() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(RecordingManager::new(test_config(dir.path())));

        manager.start_recording(None).await.unwrap();
        let path = manager.stop_recording().await.unwrap();
        assert!(path.is_none());
        assert_eq!(manager.get_state().await, RecordingState::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sessions_never_mix() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(RecordingManager::new(test_config(dir.path())));

        let first = manager.start_recording(None).await.unwrap();
        for ts in [0.0, 0.1, 0.2] {
            manager.on_frame(make_frame(ts)).await;
        }
        manager.stop_recording().await.unwrap().unwrap();

        let second = manager.start_recording(None).await.unwrap();
        for ts in [10.0, 10.1] {
            manager.on_frame(make_frame(ts)).await;
        }
        manager.stop_recording().await.unwrap().unwrap();

        let manifest_a = read_manifest(&dir.path().join(&first));
        let manifest_b = read_manifest(&dir.path().join(&second));
        assert_eq!(manifest_a.frame_num, 3);
        assert_eq!(manifest_b.frame_num, 2);
        assert!(manifest_b.frames.contains_key("10.000000"));
        assert!(manifest_b.frames.contains_key("10.100000"));
        assert!(!manifest_b.frames.contains_key("0.000000"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failed_flushes_retry_for_every_session() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file sits where the output directory should be, so
        // every directory create, artifact write and manifest flush fails
        let out_path = dir.path().join("out");
        std::fs::write(&out_path, b"").unwrap();
        let manager = Arc::new(RecordingManager::new(test_config(&out_path)));

        let first = manager.start_recording(None).await.unwrap();
        manager.on_frame(make_frame(1.0)).await;
        assert!(manager.stop_recording().await.unwrap().is_none());

        // Starting a second session retries the first flush (it fails
        // again) and must not discard the first session's metadata
        let second = manager.start_recording(None).await.unwrap();
        manager.on_frame(make_frame(2.0)).await;
        assert!(manager.stop_recording().await.unwrap().is_none());
        assert_ne!(first, second);

        // Heal the output path; the next idle frame retries both flushes
        std::fs::remove_file(&out_path).unwrap();
        std::fs::create_dir_all(out_path.join(&first)).unwrap();
        std::fs::create_dir_all(out_path.join(&second)).unwrap();
        manager.on_frame(make_frame(3.0)).await;

        let manifest_a = read_manifest(&out_path.join(&first));
        assert_eq!(manifest_a.frame_num, 1);
        assert!(manifest_a.frames.contains_key("1.000000"));
        let manifest_b = read_manifest(&out_path.join(&second));
        assert_eq!(manifest_b.frame_num, 1);
        assert!(manifest_b.frames.contains_key("2.000000"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_depth_encode_failure_keeps_frame() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(RecordingManager::new(test_config(dir.path())));

        let id = manager.start_recording(None).await.unwrap();
        let mut frame = make_frame(1.0);
        // Truncated depth buffer: the depth encode fails for this frame
        frame.depth.as_mut().unwrap().data.truncate(2);
        manager.on_frame(frame).await;
        manager.stop_recording().await.unwrap().unwrap();

        let root = dir.path().join(&id);
        let manifest = read_manifest(&root);
        assert_eq!(manifest.frame_num, 1);
        assert!(manifest.frames.contains_key("1.000000"));
        assert!(root.join("rgb/1.000000.jpg").exists());
        assert!(root.join("conf/1.000000.png").exists());
        assert!(!root.join("depth/1.000000.tiff").exists());

        // The failure surfaces through the status string, not as an abort
        manager.on_frame(make_frame(2.0)).await;
        assert!(manager.status().await.contains("Failed to encode depth"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_color_only_capture() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(RecordingManager::new(test_config(dir.path())));

        let id = manager.start_recording(None).await.unwrap();
        let mut frame = make_frame(1.0);
        frame.depth = None;
        frame.confidence = None;
        manager.on_frame(frame).await;
        manager.stop_recording().await.unwrap().unwrap();

        let root = dir.path().join(&id);
        assert!(root.join("rgb/1.000000.jpg").exists());
        assert_eq!(std::fs::read_dir(root.join("depth")).unwrap().count(), 0);
        let manifest = read_manifest(&root);
        assert_eq!(manifest.frame_num, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_start_while_recording_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(RecordingManager::new(test_config(dir.path())));

        manager.start_recording(None).await.unwrap();
        assert!(manager.start_recording(None).await.is_err());
        assert!(manager.stop_recording().await.is_ok());
        assert!(manager.stop_recording().await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_metadata_degrees_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(RecordingManager::new(test_config(dir.path())));

        let id = manager.start_recording(None).await.unwrap();
        manager.on_frame(make_frame(0.5)).await;
        manager.stop_recording().await.unwrap().unwrap();

        let manifest = read_manifest(&dir.path().join(&id));
        let record = &manifest.frames["0.500000"];
        // PI/2 radians yaw stored as 90 degrees
        assert!((record.eulr_angle[1] - 90.0).abs() < 1e-3);
        assert_eq!(record.position(), [0.1, 0.2, 0.3]);
    }
}
