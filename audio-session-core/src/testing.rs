//! Scripted backend doubles.
//!
//! Compiled for this crate's tests and, behind the `testing` feature, for
//! downstream crates that drive sessions without real audio hardware.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::config::{PlaybackSource, RecordingConfig};
use crate::models::error::BackendError;
use crate::models::events::SessionEvent;
use crate::models::output_route::{RoutePlan, RouteState};
use crate::traits::audio_router::AudioRouter;
use crate::traits::event_sink::EventSink;
use crate::traits::playback_backend::{
    CompletionListener, PlaybackBackend, PlaybackEngine, StreamCategory,
};
use crate::traits::recording_backend::{RecordingBackend, RecordingEngine};

/// Sink that keeps every event for later inspection.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.name()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &SessionEvent) {
        self.events.lock().push(event.clone());
    }
}

// -- Recording --

/// Failure switches for [`MockRecordingEngine`].
#[derive(Debug, Clone, Default)]
pub struct RecorderScript {
    pub fail_open: bool,
    pub fail_configure: bool,
    pub fail_prepare: bool,
    pub fail_start: bool,
    pub fail_pause: bool,
    pub fail_stop: bool,
    /// Written to the configured output path when `stop` succeeds.
    pub output_bytes: Option<Vec<u8>>,
}

/// What the engine and its handles were asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecorderLog {
    pub opened: usize,
    pub released: usize,
    pub calls: Vec<&'static str>,
    pub last_config: Option<RecordingConfig>,
}

impl RecorderLog {
    /// Handles opened and not yet released.
    pub fn live_handles(&self) -> usize {
        self.opened - self.released
    }
}

pub struct MockRecordingEngine {
    supports_pause: bool,
    script: Arc<Mutex<RecorderScript>>,
    log: Arc<Mutex<RecorderLog>>,
}

impl MockRecordingEngine {
    pub fn new(supports_pause: bool) -> Arc<Self> {
        Arc::new(Self {
            supports_pause,
            script: Arc::new(Mutex::new(RecorderScript::default())),
            log: Arc::new(Mutex::new(RecorderLog::default())),
        })
    }

    pub fn script(&self, update: impl FnOnce(&mut RecorderScript)) {
        update(&mut self.script.lock());
    }

    pub fn log(&self) -> RecorderLog {
        self.log.lock().clone()
    }
}

impl RecordingEngine for MockRecordingEngine {
    fn supports_pause(&self) -> bool {
        self.supports_pause
    }

    fn open(&self) -> Result<Box<dyn RecordingBackend>, BackendError> {
        if self.script.lock().fail_open {
            return Err(BackendError::new("recorder unavailable"));
        }
        self.log.lock().opened += 1;
        Ok(Box::new(MockRecordingBackend {
            script: Arc::clone(&self.script),
            log: Arc::clone(&self.log),
            config: None,
        }))
    }
}

struct MockRecordingBackend {
    script: Arc<Mutex<RecorderScript>>,
    log: Arc<Mutex<RecorderLog>>,
    config: Option<RecordingConfig>,
}

impl MockRecordingBackend {
    fn step(&self, call: &'static str, fail: bool) -> Result<(), BackendError> {
        self.log.lock().calls.push(call);
        if fail {
            Err(BackendError::new(format!("{} failed", call)))
        } else {
            Ok(())
        }
    }
}

impl RecordingBackend for MockRecordingBackend {
    fn configure(&mut self, config: &RecordingConfig) -> Result<(), BackendError> {
        let fail = self.script.lock().fail_configure;
        self.step("configure", fail)?;
        self.config = Some(config.clone());
        self.log.lock().last_config = Some(config.clone());
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), BackendError> {
        let fail = self.script.lock().fail_prepare;
        self.step("prepare", fail)
    }

    fn start(&mut self) -> Result<(), BackendError> {
        let fail = self.script.lock().fail_start;
        self.step("start", fail)
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        let fail = self.script.lock().fail_pause;
        self.step("pause", fail)
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        self.step("resume", false)
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        let (fail, bytes) = {
            let script = self.script.lock();
            (script.fail_stop, script.output_bytes.clone())
        };
        self.step("stop", fail)?;
        if let (Some(bytes), Some(config)) = (bytes, &self.config) {
            fs::write(&config.output_path, bytes)?;
        }
        Ok(())
    }

    fn release(&mut self) {
        let mut log = self.log.lock();
        log.calls.push("release");
        log.released += 1;
    }
}

// -- Playback --

/// Failure switches and media properties for [`MockPlaybackEngine`].
#[derive(Debug, Clone, Default)]
pub struct PlayerScript {
    pub fail_open: bool,
    pub fail_source: bool,
    pub fail_prepare: bool,
    pub fail_start: bool,
    /// Reported by `duration()`; seeks clamp to it.
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerLog {
    pub opened: usize,
    pub released: usize,
    pub resets: usize,
    pub calls: Vec<&'static str>,
    pub sources: Vec<PlaybackSource>,
    pub seeks: Vec<Duration>,
}

impl PlayerLog {
    pub fn live_handles(&self) -> usize {
        self.opened - self.released
    }
}

#[derive(Default)]
struct HandleState {
    listener: Option<CompletionListener>,
    position: Duration,
}

pub struct MockPlaybackEngine {
    script: Arc<Mutex<PlayerScript>>,
    log: Arc<Mutex<PlayerLog>>,
    handles: Mutex<Vec<Arc<Mutex<HandleState>>>>,
}

impl MockPlaybackEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Arc::new(Mutex::new(PlayerScript::default())),
            log: Arc::new(Mutex::new(PlayerLog::default())),
            handles: Mutex::new(Vec::new()),
        })
    }

    pub fn script(&self, update: impl FnOnce(&mut PlayerScript)) {
        update(&mut self.script.lock());
    }

    pub fn log(&self) -> PlayerLog {
        self.log.lock().clone()
    }

    /// Number of handles ever opened.
    pub fn handle_count(&self) -> usize {
        self.handles.lock().len()
    }

    /// Simulate the backend reporting end-of-stream on handle `index`.
    ///
    /// Fires even for released handles, standing in for a callback that was
    /// already in flight when the handle was torn down. Returns `false` if
    /// that handle has no listener left.
    pub fn complete(&self, index: usize) -> bool {
        let handle = match self.handles.lock().get(index) {
            Some(handle) => Arc::clone(handle),
            None => return false,
        };
        let listener = handle.lock().listener.take();
        match listener {
            Some(listener) => {
                listener();
                true
            }
            None => false,
        }
    }

    /// [`complete`](Self::complete) on the most recently opened handle.
    pub fn complete_latest(&self) -> bool {
        let count = self.handle_count();
        count > 0 && self.complete(count - 1)
    }

    /// Move the playhead of the most recently opened handle.
    pub fn set_position(&self, position: Duration) {
        if let Some(handle) = self.handles.lock().last() {
            handle.lock().position = position;
        }
    }
}

impl PlaybackEngine for MockPlaybackEngine {
    fn open(&self) -> Result<Box<dyn PlaybackBackend>, BackendError> {
        if self.script.lock().fail_open {
            return Err(BackendError::new("player unavailable"));
        }
        self.log.lock().opened += 1;
        let state = Arc::new(Mutex::new(HandleState::default()));
        self.handles.lock().push(Arc::clone(&state));
        Ok(Box::new(MockPlaybackBackend {
            script: Arc::clone(&self.script),
            log: Arc::clone(&self.log),
            state,
        }))
    }
}

struct MockPlaybackBackend {
    script: Arc<Mutex<PlayerScript>>,
    log: Arc<Mutex<PlayerLog>>,
    state: Arc<Mutex<HandleState>>,
}

impl MockPlaybackBackend {
    fn step(&self, call: &'static str, fail: bool) -> Result<(), BackendError> {
        self.log.lock().calls.push(call);
        if fail {
            Err(BackendError::new(format!("{} failed", call)))
        } else {
            Ok(())
        }
    }
}

impl PlaybackBackend for MockPlaybackBackend {
    fn reset(&mut self) {
        let mut log = self.log.lock();
        log.calls.push("reset");
        log.resets += 1;
        self.state.lock().position = Duration::ZERO;
    }

    fn set_stream_category(&mut self, _category: StreamCategory) {
        self.log.lock().calls.push("set_stream_category");
    }

    fn set_source(&mut self, source: &PlaybackSource) -> Result<(), BackendError> {
        let fail = self.script.lock().fail_source;
        self.step("set_source", fail)?;
        self.log.lock().sources.push(source.clone());
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), BackendError> {
        let fail = self.script.lock().fail_prepare;
        self.step("prepare", fail)
    }

    fn set_completion_listener(&mut self, listener: CompletionListener) {
        self.log.lock().calls.push("set_completion_listener");
        self.state.lock().listener = Some(listener);
    }

    fn start(&mut self) -> Result<(), BackendError> {
        let fail = self.script.lock().fail_start;
        self.step("start", fail)
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        self.step("pause", false)
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        self.step("stop", false)
    }

    fn seek_to(&mut self, position: Duration) {
        let position = match self.script.lock().duration {
            Some(total) => position.min(total),
            None => position,
        };
        {
            let mut log = self.log.lock();
            log.calls.push("seek_to");
            log.seeks.push(position);
        }
        self.state.lock().position = position;
    }

    fn position(&self) -> Duration {
        self.state.lock().position
    }

    fn duration(&self) -> Option<Duration> {
        self.script.lock().duration
    }

    fn release(&mut self) {
        let mut log = self.log.lock();
        log.calls.push("release");
        log.released += 1;
    }
}

// -- Routing --

#[derive(Default)]
pub struct FakeRouter {
    hardware: Mutex<RouteState>,
    applied: Mutex<Vec<RoutePlan>>,
    fail: Mutex<bool>,
}

impl FakeRouter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_hardware(&self, hardware: RouteState) {
        *self.hardware.lock() = hardware;
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    pub fn applied(&self) -> Vec<RoutePlan> {
        self.applied.lock().clone()
    }
}

impl AudioRouter for FakeRouter {
    fn hardware_state(&self) -> RouteState {
        *self.hardware.lock()
    }

    fn apply(&self, plan: &RoutePlan) -> Result<(), BackendError> {
        if *self.fail.lock() {
            return Err(BackendError::new("route not available"));
        }
        self.applied.lock().push(*plan);
        Ok(())
    }
}
