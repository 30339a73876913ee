use std::sync::Arc;

use parking_lot::Mutex;

use audio_session_core::{
    AudioRouter, EventSink, PauseFallback, PausedPlayPolicy, PlayCompletion, PlaybackEngine,
    PlayerSession, PlayerState, RecorderSession, RecorderState, RecordingEngine, SessionError,
};

use crate::error::{ErrorCode, HostError};
use crate::permissions::PermissionProbe;
use crate::settings::{PlaybackOptions, RecordingOptions};

/// Platform collaborators the host wires into its sessions.
#[derive(Clone)]
pub struct HostBackends {
    pub recording: Arc<dyn RecordingEngine>,
    pub playback: Arc<dyn PlaybackEngine>,
    pub router: Arc<dyn AudioRouter>,
    pub permissions: Arc<dyn PermissionProbe>,
}

/// Behaviour choices applied to sessions created by [`AudioHost::init`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionPolicies {
    pub pause_fallback: PauseFallback,
    pub paused_play: PausedPlayPolicy,
}

struct Sessions {
    recorder: RecorderSession,
    player: PlayerSession,
}

/// Host-facing command surface.
///
/// Owns at most one recorder and one player session between `init` and
/// `teardown`. Commands issued outside that window fail with `NO_SESSION`.
pub struct AudioHost {
    backends: HostBackends,
    sink: Arc<dyn EventSink>,
    policies: SessionPolicies,
    sessions: Mutex<Option<Sessions>>,
}

impl AudioHost {
    pub fn new(backends: HostBackends, sink: Arc<dyn EventSink>) -> Self {
        Self {
            backends,
            sink,
            policies: SessionPolicies::default(),
            sessions: Mutex::new(None),
        }
    }

    pub fn with_policies(mut self, policies: SessionPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Create the sessions. A second call keeps the existing ones.
    pub fn init(&self) {
        let mut guard = self.sessions.lock();
        if guard.is_some() {
            log::debug!("audio host already initialised");
            return;
        }

        let recorder = RecorderSession::new(
            Arc::clone(&self.backends.recording),
            Arc::clone(&self.sink),
        )
        .with_pause_fallback(self.policies.pause_fallback);

        let player = PlayerSession::new(
            Arc::clone(&self.backends.playback),
            Arc::clone(&self.backends.router),
            Arc::clone(&self.sink),
        )
        .with_paused_play(self.policies.paused_play);

        *guard = Some(Sessions { recorder, player });
        log::info!(
            "audio host initialised (recorder pause supported: {})",
            self.backends.recording.supports_pause()
        );
    }

    /// Discard both sessions: timers stop, backends are released and any
    /// pending play resolves as stopped.
    pub fn teardown(&self) {
        let sessions = self.sessions.lock().take();
        if let Some(sessions) = sessions {
            sessions.recorder.discard();
            sessions.player.discard();
            log::info!("audio host torn down");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.sessions.lock().is_some()
    }

    // -- Permissions --

    pub fn check_authorization_status(&self) -> Result<bool, HostError> {
        self.backends
            .permissions
            .check_microphone_permission()
            .map_err(HostError::recorder)
    }

    // -- Recording --

    /// Returns the output path.
    pub fn prepare_recording(
        &self,
        path: &str,
        options: &RecordingOptions,
    ) -> Result<String, HostError> {
        let path = non_empty_path(path)?;
        if !self.check_authorization_status()? {
            log::error!("recording rejected: microphone permission denied");
            return Err(HostError::recorder(SessionError::PermissionDenied));
        }

        let config = options.to_config();
        self.with_recorder(|recorder| recorder.prepare(path, config))
            .map(|path| path.to_string_lossy().into_owned())
    }

    pub fn start_recording(&self) -> Result<String, HostError> {
        self.with_recorder(|recorder| recorder.start())
            .map(|path| path.to_string_lossy().into_owned())
    }

    pub fn pause_recording(&self) -> Result<(), HostError> {
        self.with_recorder(|recorder| recorder.pause())
    }

    pub fn resume_recording(&self) -> Result<(), HostError> {
        self.with_recorder(|recorder| recorder.resume())
    }

    /// Returns the finished file's path. `recordingFinished` goes out through the sink.
    pub fn stop_recording(&self) -> Result<String, HostError> {
        self.with_recorder(|recorder| recorder.stop())
            .map(|result| result.file_path.to_string_lossy().into_owned())
    }

    pub fn recorder_state(&self) -> Result<RecorderState, HostError> {
        self.with_recorder(|recorder| Ok(recorder.state()))
    }

    // -- Playback --

    pub fn play(&self, path: &str, options: &PlaybackOptions) -> Result<PlayCompletion, HostError> {
        let path = non_empty_path(path)?;
        let settings = options.to_settings();
        self.with_player(|player| player.play(path, settings))
    }

    pub fn play_url(&self, url: &str, options: &PlaybackOptions) -> Result<PlayCompletion, HostError> {
        let url = non_empty_path(url)?;
        let settings = options.to_settings();
        self.with_player(|player| player.play_url(url, settings))
    }

    pub fn pause_player(&self) -> Result<String, HostError> {
        self.with_player(|player| player.pause())
    }

    pub fn unpause_player(&self) -> Result<String, HostError> {
        self.with_player(|player| player.unpause())
    }

    pub fn stop_player(&self) -> Result<String, HostError> {
        self.with_player(|player| player.stop())
    }

    pub fn seek(&self, seconds: f64) -> Result<(), HostError> {
        self.with_player(|player| player.seek(seconds))
    }

    /// Seconds, `None` when the backend cannot tell.
    pub fn get_duration(&self) -> Result<Option<f64>, HostError> {
        self.with_player(|player| player.duration())
            .map(|d| d.map(|d| d.as_secs_f64()))
    }

    pub fn get_duration_from_path(&self, path: &str) -> Result<Option<f64>, HostError> {
        let path = non_empty_path(path)?;
        self.with_player(|player| player.duration_of(path))
            .map(|d| d.map(|d| d.as_secs_f64()))
    }

    /// Route names available with the current hardware.
    pub fn get_outputs(&self) -> Result<Vec<String>, HostError> {
        self.with_player(|player| {
            Ok(player.outputs().iter().map(|route| route.name().to_string()).collect())
        })
    }

    pub fn player_state(&self) -> Result<PlayerState, HostError> {
        self.with_player(|player| Ok(player.state()))
    }

    fn with_recorder<T>(
        &self,
        f: impl FnOnce(&RecorderSession) -> Result<T, SessionError>,
    ) -> Result<T, HostError> {
        let guard = self.sessions.lock();
        let sessions = guard.as_ref().ok_or_else(HostError::no_session)?;
        f(&sessions.recorder).map_err(HostError::recorder)
    }

    fn with_player<T>(
        &self,
        f: impl FnOnce(&PlayerSession) -> Result<T, SessionError>,
    ) -> Result<T, HostError> {
        let guard = self.sessions.lock();
        let sessions = guard.as_ref().ok_or_else(HostError::no_session)?;
        f(&sessions.player).map_err(HostError::player)
    }
}

impl Drop for AudioHost {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn non_empty_path(path: &str) -> Result<String, HostError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(HostError::new(ErrorCode::InvalidPath, "path must not be empty"));
    }
    Ok(trimmed.to_string())
}
