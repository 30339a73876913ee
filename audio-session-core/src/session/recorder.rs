use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::config::RecordingConfig;
use crate::models::error::SessionError;
use crate::models::events::{RecordingFinishedPayload, SessionEvent, STATUS_OK};
use crate::models::recording_result::RecordingResult;
use crate::models::state::RecorderState;
use crate::storage::inline_payload;
use crate::timing::progress_timer::{ProgressTimer, RECORDER_PROGRESS_INTERVAL};
use crate::timing::stop_watch::StopWatch;
use crate::traits::event_sink::EventSink;
use crate::traits::recording_backend::{RecordingBackend, RecordingEngine};

/// What `pause`/`resume` do when the engine cannot pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PauseFallback {
    /// Reject with `UnsupportedOperation`.
    #[default]
    Reject,
    /// `pause` finalizes the recording exactly like `stop`. The session never
    /// enters `Paused`, so `resume` is then rejected with `InvalidState`.
    Stop,
}

/// Backend handle plus the frozen config it was prepared with.
struct PreparedRecording {
    id: Uuid,
    backend: Box<dyn RecordingBackend>,
    config: RecordingConfig,
}

impl PreparedRecording {
    fn release(mut self) {
        self.backend.release();
    }
}

/// Mutable recorder state, protected by `parking_lot::Mutex`.
///
/// `prepared` is `Some` exactly when `state` is not `Idle`.
struct RecorderInner {
    state: RecorderState,
    prepared: Option<PreparedRecording>,
    stop_watch: StopWatch,
    timer: Option<ProgressTimer>,
}

impl RecorderInner {
    fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            prepared: None,
            stop_watch: StopWatch::new(),
            timer: None,
        }
    }

    fn release_prepared(&mut self) {
        if let Some(prepared) = self.prepared.take() {
            log::debug!("releasing recorder handle {}", prepared.id);
            prepared.release();
        }
        self.state = RecorderState::Idle;
    }
}

/// Capture lifecycle: prepare → start → (pause ⇄ resume) → stop.
///
/// Commands are expected to be serialized by the host. The progress timer
/// runs on its own thread and only reads the stopwatch.
pub struct RecorderSession {
    engine: Arc<dyn RecordingEngine>,
    sink: Arc<dyn EventSink>,
    inner: Arc<Mutex<RecorderInner>>,
    supports_pause: bool,
    pause_fallback: PauseFallback,
    progress_interval: Duration,
}

impl RecorderSession {
    pub fn new(engine: Arc<dyn RecordingEngine>, sink: Arc<dyn EventSink>) -> Self {
        let supports_pause = engine.supports_pause();
        if !supports_pause {
            log::info!("recording backend cannot pause; pause/resume are unavailable");
        }
        Self {
            engine,
            sink,
            inner: Arc::new(Mutex::new(RecorderInner::new())),
            supports_pause,
            pause_fallback: PauseFallback::default(),
            progress_interval: RECORDER_PROGRESS_INTERVAL,
        }
    }

    pub fn with_pause_fallback(mut self, fallback: PauseFallback) -> Self {
        self.pause_fallback = fallback;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn state(&self) -> RecorderState {
        self.inner.lock().state
    }

    pub fn supports_pause(&self) -> bool {
        self.supports_pause
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.inner
            .lock()
            .prepared
            .as_ref()
            .map(|p| p.config.output_path.clone())
    }

    pub fn config(&self) -> Option<RecordingConfig> {
        self.inner.lock().prepared.as_ref().map(|p| p.config.clone())
    }

    /// Active recording time so far, excluding pauses.
    pub fn elapsed(&self) -> Duration {
        self.inner.lock().stop_watch.elapsed()
    }

    /// Allocate and configure a fresh backend writing to `path`.
    ///
    /// Any previously prepared handle is released first. On failure the
    /// session is left `Idle` with no handle.
    pub fn prepare(
        &self,
        path: impl Into<PathBuf>,
        mut config: RecordingConfig,
    ) -> Result<PathBuf, SessionError> {
        let path = path.into();
        let mut inner = self.inner.lock();

        if inner.state.is_active() {
            log::error!("prepare rejected: recording in progress");
            return Err(SessionError::invalid_state(
                "stop the current recording before preparing a new one",
            ));
        }

        inner.release_prepared();
        inner.stop_watch.reset();

        config.output_path = path.clone();
        if let Err(msg) = config.validate() {
            log::error!("invalid recording config: {}", msg);
            return Err(SessionError::ConfigurationError(msg));
        }

        let mut backend = self
            .engine
            .open()
            .map_err(|e| SessionError::ConfigurationError(format!("couldn't open recorder: {}", e)))?;

        if let Err(e) = backend.configure(&config) {
            backend.release();
            log::error!("couldn't configure recorder: {}", e);
            return Err(SessionError::ConfigurationError(e.to_string()));
        }

        if let Err(e) = backend.prepare() {
            backend.release();
            log::error!("couldn't prepare recording at {}: {}", path.display(), e);
            return Err(SessionError::PrepareError(format!(
                "couldn't prepare recording at {}: {}",
                path.display(),
                e
            )));
        }

        let id = Uuid::new_v4();
        log::info!("recording {} prepared at {}", id, path.display());
        inner.prepared = Some(PreparedRecording { id, backend, config });
        inner.state = RecorderState::Prepared;
        Ok(path)
    }

    /// Start capturing. Transitions: prepared → recording.
    pub fn start(&self) -> Result<PathBuf, SessionError> {
        let mut inner = self.inner.lock();

        match inner.state {
            RecorderState::Idle => {
                log::error!("start rejected: recording not prepared");
                return Err(SessionError::not_prepared(
                    "call prepare before starting recording",
                ));
            }
            RecorderState::Recording | RecorderState::Paused => {
                log::error!("start rejected: already recording");
                return Err(SessionError::invalid_state(
                    "stop the current recording before starting again",
                ));
            }
            RecorderState::Prepared => {}
        }

        let Some(prepared) = inner.prepared.as_mut() else {
            return Err(SessionError::not_prepared("no recording backend"));
        };
        if let Err(e) = prepared.backend.start() {
            log::error!("recorder failed to start: {}", e);
            inner.release_prepared();
            return Err(SessionError::BackendFailure(e.to_string()));
        }
        let path = prepared.config.output_path.clone();

        inner.stop_watch.reset();
        inner.stop_watch.start();
        inner.state = RecorderState::Recording;

        match self.spawn_progress_timer() {
            Ok(timer) => inner.timer = Some(timer),
            Err(e) => {
                if let Some(prepared) = inner.prepared.as_mut() {
                    let _ = prepared.backend.stop();
                }
                inner.release_prepared();
                inner.stop_watch.reset();
                return Err(e);
            }
        }

        log::info!("recording started: {}", path.display());
        Ok(path)
    }

    /// Suspend capture. Transitions: recording → paused.
    ///
    /// The progress timer keeps running but emits nothing while paused.
    pub fn pause(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();

        if !inner.state.is_recording() {
            log::error!("pause rejected from {:?}", inner.state);
            return Err(SessionError::invalid_state("can only pause while recording"));
        }

        if !self.supports_pause {
            match self.pause_fallback {
                PauseFallback::Reject => {
                    log::error!("pause rejected: backend cannot pause");
                    return Err(SessionError::UnsupportedOperation(
                        "pause is not available on this recording backend".into(),
                    ));
                }
                PauseFallback::Stop => {
                    log::warn!("backend cannot pause; stopping recording instead");
                    let (outcome, timer) = self.stop_locked(&mut inner);
                    drop(inner);
                    if let Some(timer) = timer {
                        timer.join();
                    }
                    return outcome.map(|_| ());
                }
            }
        }

        let Some(prepared) = inner.prepared.as_mut() else {
            return Err(SessionError::not_prepared("no recording backend"));
        };
        prepared.backend.pause().map_err(|e| {
            log::error!("recorder failed to pause: {}", e);
            SessionError::BackendFailure(e.to_string())
        })?;

        inner.stop_watch.stop();
        inner.state = RecorderState::Paused;
        log::debug!("recording paused at {:?}", inner.stop_watch.elapsed());
        Ok(())
    }

    /// Continue capture. Transitions: paused → recording.
    pub fn resume(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();

        if !inner.state.is_paused() {
            log::error!("resume rejected from {:?}", inner.state);
            return Err(SessionError::invalid_state("can only resume while paused"));
        }

        let Some(prepared) = inner.prepared.as_mut() else {
            return Err(SessionError::not_prepared("no recording backend"));
        };
        prepared.backend.resume().map_err(|e| {
            log::error!("recorder failed to resume: {}", e);
            SessionError::BackendFailure(e.to_string())
        })?;

        inner.stop_watch.start();
        inner.state = RecorderState::Recording;
        Ok(())
    }

    /// Stop capture, finalize the file and emit `recordingFinished`.
    /// Transitions: recording/paused → idle.
    pub fn stop(&self) -> Result<RecordingResult, SessionError> {
        let (outcome, timer) = {
            let mut inner = self.inner.lock();
            self.stop_locked(&mut inner)
        };
        if let Some(timer) = timer {
            timer.join();
        }
        outcome
    }

    /// Tear the session down: an active recording is finalized, a prepared
    /// handle is released.
    pub fn discard(&self) {
        let timer = {
            let mut inner = self.inner.lock();
            if inner.state.is_active() {
                let (outcome, timer) = self.stop_locked(&mut inner);
                if let Err(e) = outcome {
                    log::warn!("recording discarded with error: {}", e);
                }
                timer
            } else {
                inner.release_prepared();
                None
            }
        };
        if let Some(timer) = timer {
            timer.join();
        }
    }

    /// Returns the cancelled timer so the caller can join it after unlocking.
    fn stop_locked(
        &self,
        inner: &mut RecorderInner,
    ) -> (Result<RecordingResult, SessionError>, Option<ProgressTimer>) {
        if !inner.state.is_active() {
            log::error!("stop rejected from {:?}", inner.state);
            return (
                Err(SessionError::invalid_state("call start before stopping recording")),
                None,
            );
        }

        // Cancel under the lock, before the handle goes away.
        let timer = inner.timer.take();
        if let Some(ref timer) = timer {
            timer.cancel();
        }

        let duration = inner.stop_watch.stop();
        inner.state = RecorderState::Idle;

        let Some(mut prepared) = inner.prepared.take() else {
            return (
                Err(SessionError::not_prepared("no recording backend")),
                timer,
            );
        };

        let finalized = prepared.backend.stop();
        prepared.backend.release();

        if let Err(e) = finalized {
            log::error!("recording {} produced no valid audio: {}", prepared.id, e);
            return (
                Err(SessionError::BackendFailure(format!(
                    "no valid audio data received: {}",
                    e
                ))),
                timer,
            );
        }

        let config = prepared.config;
        let base64 = if config.include_inline_payload {
            inline_payload::encode_file_or_empty(&config.output_path)
        } else {
            String::new()
        };

        let result = RecordingResult::new(prepared.id, config.output_path, duration.as_secs_f64());
        log::info!(
            "recording {} finished: {} ({:.2}s)",
            result.recording_id,
            result.file_path.display(),
            result.duration_secs
        );

        self.sink.emit(&SessionEvent::RecordingFinished(RecordingFinishedPayload {
            status: STATUS_OK.to_string(),
            audio_file_url: result.audio_file_url(),
            base64,
        }));

        (Ok(result), timer)
    }

    fn spawn_progress_timer(&self) -> Result<ProgressTimer, SessionError> {
        let weak: Weak<Mutex<RecorderInner>> = Arc::downgrade(&self.inner);
        let sink = Arc::clone(&self.sink);

        ProgressTimer::spawn("recorder-progress", self.progress_interval, move |token| {
            let Some(session) = weak.upgrade() else {
                token.cancel();
                return;
            };
            let inner = session.lock();
            if token.is_cancelled() || !inner.state.is_recording() {
                return;
            }
            let elapsed = inner.stop_watch.elapsed().as_secs_f64();
            sink.emit(&SessionEvent::recording_progress(elapsed));
        })
    }
}

impl Drop for RecorderSession {
    fn drop(&mut self) {
        self.discard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CollectingSink, MockRecordingEngine};
    use std::fs;
    use std::thread;

    fn session(engine: &Arc<MockRecordingEngine>, sink: &Arc<CollectingSink>) -> RecorderSession {
        RecorderSession::new(engine.clone(), sink.clone())
            .with_progress_interval(Duration::from_millis(20))
    }

    fn aac_config() -> RecordingConfig {
        RecordingConfig::default()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("audio_session_recorder_{}", name))
    }

    #[test]
    fn full_lifecycle_emits_finished() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        assert_eq!(recorder.prepare("/tmp/a.mp4", aac_config()).unwrap(), PathBuf::from("/tmp/a.mp4"));
        assert_eq!(recorder.state(), RecorderState::Prepared);

        assert_eq!(recorder.start().unwrap(), PathBuf::from("/tmp/a.mp4"));
        assert_eq!(recorder.state(), RecorderState::Recording);

        recorder.pause().unwrap();
        assert_eq!(recorder.state(), RecorderState::Paused);

        recorder.resume().unwrap();
        assert_eq!(recorder.state(), RecorderState::Recording);

        let result = recorder.stop().unwrap();
        assert_eq!(result.file_path, PathBuf::from("/tmp/a.mp4"));
        assert_eq!(recorder.state(), RecorderState::Idle);

        let finished: Vec<_> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::RecordingFinished(payload) => Some(payload),
                _ => None,
            })
            .collect();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].status, "OK");
        assert_eq!(finished[0].audio_file_url, "file:///tmp/a.mp4");
        assert_eq!(finished[0].base64, "");

        let log = engine.log();
        assert_eq!(log.live_handles(), 0);
        assert_eq!(
            log.calls,
            vec!["configure", "prepare", "start", "pause", "resume", "stop", "release"]
        );
    }

    #[test]
    fn prepare_passes_parameters_to_backend() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        let config = RecordingConfig {
            sample_rate_hz: 16_000,
            channel_count: 1,
            include_inline_payload: true,
            ..aac_config()
        };
        recorder.prepare("/tmp/b.mp4", config).unwrap();

        let seen = engine.log().last_config.unwrap();
        assert_eq!(seen.sample_rate_hz, 16_000);
        assert_eq!(seen.channel_count, 1);
        assert_eq!(seen.output_path, PathBuf::from("/tmp/b.mp4"));
        assert_eq!(recorder.output_path(), Some(PathBuf::from("/tmp/b.mp4")));
    }

    #[test]
    fn reprepare_releases_prior_handle() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        recorder.prepare("/tmp/b.mp4", aac_config()).unwrap();

        let log = engine.log();
        assert_eq!(log.opened, 2);
        assert_eq!(log.live_handles(), 1);
        assert_eq!(recorder.output_path(), Some(PathBuf::from("/tmp/b.mp4")));
    }

    #[test]
    fn prepare_while_recording_is_rejected() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        recorder.start().unwrap();

        let err = recorder.prepare("/tmp/b.mp4", aac_config()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidState(_)));
        assert_eq!(recorder.state(), RecorderState::Recording);
        assert_eq!(recorder.output_path(), Some(PathBuf::from("/tmp/a.mp4")));

        recorder.pause().unwrap();
        assert!(matches!(
            recorder.prepare("/tmp/b.mp4", aac_config()),
            Err(SessionError::InvalidState(_))
        ));
    }

    #[test]
    fn configuration_failure_leaves_idle_without_handle() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);
        engine.script(|s| s.fail_configure = true);

        let err = recorder.prepare("/tmp/a.mp4", aac_config()).unwrap_err();
        assert!(matches!(err, SessionError::ConfigurationError(_)));
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(engine.log().live_handles(), 0);
    }

    #[test]
    fn invalid_config_never_reaches_backend() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        let config = RecordingConfig { channel_count: 8, ..aac_config() };
        let err = recorder.prepare("/tmp/a.mp4", config).unwrap_err();
        assert!(matches!(err, SessionError::ConfigurationError(_)));
        assert_eq!(engine.log().opened, 0);
    }

    #[test]
    fn prepare_failure_is_reported() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);
        engine.script(|s| s.fail_prepare = true);

        let err = recorder.prepare("/tmp/a.mp4", aac_config()).unwrap_err();
        assert!(matches!(err, SessionError::PrepareError(_)));
        assert!(err.to_string().contains("/tmp/a.mp4"));
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(engine.log().live_handles(), 0);
    }

    #[test]
    fn start_requires_prepare() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        assert!(matches!(recorder.start(), Err(SessionError::NotPrepared(_))));
        assert_eq!(recorder.state(), RecorderState::Idle);
    }

    #[test]
    fn double_start_is_rejected() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        recorder.start().unwrap();
        assert!(matches!(recorder.start(), Err(SessionError::InvalidState(_))));
        assert_eq!(recorder.state(), RecorderState::Recording);
    }

    #[test]
    fn invalid_commands_leave_state_unchanged() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        assert!(matches!(recorder.pause(), Err(SessionError::InvalidState(_))));
        assert!(matches!(recorder.resume(), Err(SessionError::InvalidState(_))));
        assert!(matches!(recorder.stop(), Err(SessionError::InvalidState(_))));
        assert_eq!(recorder.state(), RecorderState::Idle);

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        assert!(matches!(recorder.pause(), Err(SessionError::InvalidState(_))));
        assert!(matches!(recorder.resume(), Err(SessionError::InvalidState(_))));
        assert!(matches!(recorder.stop(), Err(SessionError::InvalidState(_))));
        assert_eq!(recorder.state(), RecorderState::Prepared);

        recorder.start().unwrap();
        assert!(matches!(recorder.resume(), Err(SessionError::InvalidState(_))));
        recorder.pause().unwrap();
        assert!(matches!(recorder.pause(), Err(SessionError::InvalidState(_))));
        assert_eq!(recorder.state(), RecorderState::Paused);

        assert_eq!(sink.count("recordingFinished"), 0);
    }

    #[test]
    fn pause_unsupported_is_rejected_by_default() {
        let engine = MockRecordingEngine::new(false);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);
        assert!(!recorder.supports_pause());

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        recorder.start().unwrap();

        let err = recorder.pause().unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedOperation(_)));
        assert_eq!(recorder.state(), RecorderState::Recording);
        assert!(!engine.log().calls.contains(&"pause"));
    }

    #[test]
    fn pause_as_stop_fallback_finalizes() {
        let engine = MockRecordingEngine::new(false);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink).with_pause_fallback(PauseFallback::Stop);

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        recorder.start().unwrap();
        recorder.pause().unwrap();

        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(sink.count("recordingFinished"), 1);
        assert!(matches!(recorder.resume(), Err(SessionError::InvalidState(_))));
        assert_eq!(engine.log().live_handles(), 0);
    }

    #[test]
    fn pause_backend_failure_keeps_recording() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);
        engine.script(|s| s.fail_pause = true);

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        recorder.start().unwrap();
        assert!(matches!(recorder.pause(), Err(SessionError::BackendFailure(_))));
        assert_eq!(recorder.state(), RecorderState::Recording);
    }

    #[test]
    fn start_failure_releases_handle() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);
        engine.script(|s| s.fail_start = true);

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        assert!(matches!(recorder.start(), Err(SessionError::BackendFailure(_))));
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(engine.log().live_handles(), 0);
    }

    #[test]
    fn finalize_failure_still_releases() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);
        engine.script(|s| s.fail_stop = true);

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        recorder.start().unwrap();

        let err = recorder.stop().unwrap_err();
        assert!(matches!(err, SessionError::BackendFailure(_)));
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(engine.log().live_handles(), 0);
        assert_eq!(sink.count("recordingFinished"), 0);
    }

    #[test]
    fn inline_payload_is_attached() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);
        engine.script(|s| s.output_bytes = Some(b"hello".to_vec()));

        let path = temp_path("inline.mp4");
        let config = RecordingConfig { include_inline_payload: true, ..aac_config() };
        recorder.prepare(&path, config).unwrap();
        recorder.start().unwrap();
        recorder.stop().unwrap();

        match sink.events().last() {
            Some(SessionEvent::RecordingFinished(payload)) => assert_eq!(payload.base64, "aGVsbG8="),
            other => panic!("unexpected last event: {:?}", other),
        }

        fs::remove_file(&path).ok();
    }

    #[test]
    fn unreadable_inline_payload_is_not_fatal() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        let path = temp_path("never-written.mp4");
        let config = RecordingConfig { include_inline_payload: true, ..aac_config() };
        recorder.prepare(&path, config).unwrap();
        recorder.start().unwrap();
        recorder.stop().unwrap();

        match sink.events().last() {
            Some(SessionEvent::RecordingFinished(payload)) => {
                assert_eq!(payload.status, "OK");
                assert_eq!(payload.base64, "");
            }
            other => panic!("unexpected last event: {:?}", other),
        }
    }

    #[test]
    fn progress_ticks_while_recording_only() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        recorder.start().unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(sink.count("recordingProgress") >= 2);

        recorder.pause().unwrap();
        let paused_at = sink.count("recordingProgress");
        thread::sleep(Duration::from_millis(100));
        assert_eq!(sink.count("recordingProgress"), paused_at);

        recorder.resume().unwrap();
        thread::sleep(Duration::from_millis(60));
        assert!(sink.count("recordingProgress") > paused_at);

        recorder.stop().unwrap();
        let names = sink.names();
        assert_eq!(names.last(), Some(&"recordingFinished"));

        thread::sleep(Duration::from_millis(80));
        assert_eq!(sink.names().len(), names.len(), "progress emitted after stop");
    }

    #[test]
    fn elapsed_excludes_pause() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        let recorder = session(&engine, &sink);

        recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
        recorder.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        recorder.pause().unwrap();
        thread::sleep(Duration::from_millis(300));
        recorder.resume().unwrap();
        thread::sleep(Duration::from_millis(50));
        let result = recorder.stop().unwrap();

        assert!(result.duration_secs >= 0.1);
        assert!(result.duration_secs < 0.3, "paused time counted: {}", result.duration_secs);
    }

    #[test]
    fn drop_releases_active_recording() {
        let engine = MockRecordingEngine::new(true);
        let sink = CollectingSink::new();
        {
            let recorder = session(&engine, &sink);
            recorder.prepare("/tmp/a.mp4", aac_config()).unwrap();
            recorder.start().unwrap();
        }
        assert_eq!(engine.log().live_handles(), 0);
    }
}
