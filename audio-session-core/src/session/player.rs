use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::config::{PlaybackSettings, PlaybackSource};
use crate::models::error::{BackendError, SessionError};
use crate::models::events::SessionEvent;
use crate::models::output_route::OutputRoute;
use crate::models::state::PlayerState;
use crate::session::completion::{self, PlayCompletion, PlayOutcome, PlayResolver};
use crate::timing::progress_timer::{ProgressTimer, PLAYER_PROGRESS_INTERVAL};
use crate::traits::audio_router::AudioRouter;
use crate::traits::event_sink::EventSink;
use crate::traits::playback_backend::{
    CompletionListener, PlaybackBackend, PlaybackEngine, StreamCategory,
};

/// What `play` does when the session is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PausedPlayPolicy {
    /// Resume the paused playback and ignore the requested source.
    #[default]
    ResumeExisting,
    /// Stop the paused playback and start the requested source.
    Restart,
}

/// One unresolved `play` invocation.
struct ActivePlayback {
    id: Uuid,
    resolver: PlayResolver,
}

/// Mutable player state, protected by `parking_lot::Mutex`.
struct PlayerInner {
    state: PlayerState,
    backend: Option<Box<dyn PlaybackBackend>>,
    source: Option<PlaybackSource>,
    resume_position: Duration,
    timer: Option<ProgressTimer>,
    playback: Option<ActivePlayback>,
}

/// Leftovers of a torn-down playback that must be handled after unlocking.
struct Teardown {
    timer: Option<ProgressTimer>,
    location: String,
    stopped: Result<(), BackendError>,
}

impl Teardown {
    fn join_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.join();
        }
    }
}

impl PlayerInner {
    fn new() -> Self {
        Self {
            state: PlayerState::Idle,
            backend: None,
            source: None,
            resume_position: Duration::ZERO,
            timer: None,
            playback: None,
        }
    }

    fn location(&self) -> String {
        self.source.as_ref().map(|s| s.location()).unwrap_or_default()
    }

    /// Cancel the timer, then stop and release the backend and resolve the
    /// pending play with `outcome`. Leaves the session `Idle`.
    fn teardown(&mut self, outcome: fn(String) -> PlayOutcome) -> Teardown {
        let timer = self.timer.take();
        if let Some(ref timer) = timer {
            timer.cancel();
        }

        let mut stopped = Ok(());
        if let Some(mut backend) = self.backend.take() {
            stopped = backend.stop();
            backend.release();
        }

        let location = self.location();
        self.source = None;
        self.state = PlayerState::Idle;
        self.resume_position = Duration::ZERO;

        if let Some(playback) = self.playback.take() {
            log::debug!("playback {} resolved", playback.id);
            playback.resolver.resolve(outcome(location.clone()));
        }

        Teardown {
            timer,
            location,
            stopped,
        }
    }

    fn release_backend(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.release();
        }
        self.source = None;
        self.state = PlayerState::Idle;
    }
}

/// Playback lifecycle: prepare → play → (pause ⇄ unpause) → stop / end-of-stream.
///
/// Every `play` resolves its [`PlayCompletion`] exactly once, with whichever
/// of explicit stop, replacement, teardown or natural completion happens
/// first. Completion callbacks from handles that are no longer current are
/// ignored.
pub struct PlayerSession {
    engine: Arc<dyn PlaybackEngine>,
    router: Arc<dyn AudioRouter>,
    sink: Arc<dyn EventSink>,
    inner: Arc<Mutex<PlayerInner>>,
    paused_play: PausedPlayPolicy,
    progress_interval: Duration,
}

impl PlayerSession {
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        router: Arc<dyn AudioRouter>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            engine,
            router,
            sink,
            inner: Arc::new(Mutex::new(PlayerInner::new())),
            paused_play: PausedPlayPolicy::default(),
            progress_interval: PLAYER_PROGRESS_INTERVAL,
        }
    }

    pub fn with_paused_play(mut self, policy: PausedPlayPolicy) -> Self {
        self.paused_play = policy;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn state(&self) -> PlayerState {
        self.inner.lock().state
    }

    pub fn current_source(&self) -> Option<PlaybackSource> {
        self.inner.lock().source.clone()
    }

    /// Routes available with the hardware currently attached.
    pub fn outputs(&self) -> Vec<OutputRoute> {
        self.router.hardware_state().available_outputs()
    }

    /// Reset (or allocate) the backend and load `source`.
    ///
    /// On failure the handle stays allocated but unprepared and the session
    /// is `Idle`; the next prepare resets it.
    pub fn prepare(&self, source: PlaybackSource) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if inner.state.is_playing() || inner.state.is_paused() {
            log::error!("prepare rejected from {:?}", inner.state);
            return Err(SessionError::invalid_state(
                "stop playback before preparing another source",
            ));
        }
        self.prepare_locked(&mut inner, source)
    }

    /// Play a local file. Resolves when playback ends.
    pub fn play(
        &self,
        path: impl Into<PathBuf>,
        settings: PlaybackSettings,
    ) -> Result<PlayCompletion, SessionError> {
        self.play_source(PlaybackSource::Local(path.into()), settings)
    }

    /// Play a remote URI. Same lifecycle as [`play`](Self::play).
    pub fn play_url(
        &self,
        url: impl Into<String>,
        settings: PlaybackSettings,
    ) -> Result<PlayCompletion, SessionError> {
        self.play_source(PlaybackSource::Remote(url.into()), settings)
    }

    pub fn play_source(
        &self,
        source: PlaybackSource,
        settings: PlaybackSettings,
    ) -> Result<PlayCompletion, SessionError> {
        let mut retired = None;
        let outcome = {
            let mut inner = self.inner.lock();
            self.play_locked(&mut inner, source, settings, &mut retired)
        };
        if let Some(mut teardown) = retired {
            teardown.join_timer();
        }
        outcome
    }

    /// Pause playback. Transitions: playing → paused. Returns the current path.
    pub fn pause(&self) -> Result<String, SessionError> {
        let (location, timer) = {
            let mut inner = self.inner.lock();
            if !inner.state.is_playing() {
                log::error!("pause rejected from {:?}", inner.state);
                return Err(SessionError::invalid_state("call play before pausing playback"));
            }

            let Some(backend) = inner.backend.as_mut() else {
                return Err(SessionError::not_prepared("no playback backend"));
            };
            backend.pause().map_err(|e| {
                log::error!("player failed to pause: {}", e);
                SessionError::BackendFailure(e.to_string())
            })?;
            let position = backend.position();

            let timer = inner.timer.take();
            if let Some(ref timer) = timer {
                timer.cancel();
            }
            inner.resume_position = position;
            inner.state = PlayerState::Paused;
            log::debug!("playback paused at {:?}", position);
            (inner.location(), timer)
        };
        if let Some(timer) = timer {
            timer.join();
        }
        Ok(location)
    }

    /// Resume from the captured position. Transitions: paused → playing.
    pub fn unpause(&self) -> Result<String, SessionError> {
        let mut inner = self.inner.lock();
        self.unpause_locked(&mut inner)
    }

    /// Stop playback and release the backend. Transitions: playing → idle.
    pub fn stop(&self) -> Result<String, SessionError> {
        let mut teardown = {
            let mut inner = self.inner.lock();
            if !inner.state.is_playing() {
                log::error!("stop rejected from {:?}", inner.state);
                return Err(SessionError::invalid_state("call play before stopping playback"));
            }
            inner.teardown(PlayOutcome::Stopped)
        };
        teardown.join_timer();

        match teardown.stopped {
            Ok(()) => {
                log::info!("playback stopped: {}", teardown.location);
                Ok(teardown.location)
            }
            Err(e) => {
                log::error!("player failed to stop cleanly: {}", e);
                Err(SessionError::BackendFailure(e.to_string()))
            }
        }
    }

    /// Jump to `seconds`. Negative offsets clamp to zero, offsets past the end
    /// clamp to the duration when it is known, non-finite offsets are ignored.
    pub fn seek(&self, seconds: f64) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if !inner.state.has_prepared_backend() {
            log::error!("seek rejected: no playback");
            return Err(SessionError::not_prepared("no playback to seek"));
        }
        let is_paused = inner.state.is_paused();

        let Some(backend) = inner.backend.as_mut() else {
            return Err(SessionError::not_prepared("no playback backend"));
        };
        if !seconds.is_finite() {
            log::warn!("ignoring seek to {}", seconds);
            return Ok(());
        }

        let mut target = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX);
        if let Some(total) = backend.duration() {
            target = target.min(total);
        }
        backend.seek_to(target);

        if is_paused {
            inner.resume_position = target;
        }
        Ok(())
    }

    pub fn position(&self) -> Result<Duration, SessionError> {
        let inner = self.inner.lock();
        match inner.backend.as_ref() {
            Some(backend) if inner.state.has_prepared_backend() => Ok(backend.position()),
            _ => Err(SessionError::not_prepared("no playback")),
        }
    }

    /// Length of the prepared source, `None` if the backend cannot tell.
    pub fn duration(&self) -> Result<Option<Duration>, SessionError> {
        let inner = self.inner.lock();
        match inner.backend.as_ref() {
            Some(backend) if inner.state.has_prepared_backend() => Ok(backend.duration()),
            _ => {
                log::error!("duration requested before prepare");
                Err(SessionError::not_prepared("call play or prepare first"))
            }
        }
    }

    /// Prepare the local file at `path` and report its length.
    pub fn duration_of(&self, path: impl Into<PathBuf>) -> Result<Option<Duration>, SessionError> {
        let mut inner = self.inner.lock();
        if inner.state.is_playing() || inner.state.is_paused() {
            log::error!("duration_of rejected from {:?}", inner.state);
            return Err(SessionError::invalid_state(
                "stop playback before probing another file",
            ));
        }
        self.prepare_locked(&mut inner, PlaybackSource::Local(path.into()))?;
        Ok(inner.backend.as_ref().and_then(|b| b.duration()))
    }

    /// Tear down any playback (resolving it as stopped) and release the backend.
    pub fn discard(&self) {
        let teardown = {
            let mut inner = self.inner.lock();
            if inner.state.is_playing() || inner.state.is_paused() {
                Some(inner.teardown(PlayOutcome::Stopped))
            } else {
                inner.release_backend();
                None
            }
        };
        if let Some(mut teardown) = teardown {
            teardown.join_timer();
        }
    }

    fn prepare_locked(
        &self,
        inner: &mut PlayerInner,
        source: PlaybackSource,
    ) -> Result<(), SessionError> {
        let mut backend = match inner.backend.take() {
            Some(mut backend) => {
                backend.reset();
                backend
            }
            None => self.engine.open().map_err(|e| {
                log::error!("couldn't open player: {}", e);
                SessionError::PrepareError(format!("couldn't open player: {}", e))
            })?,
        };

        inner.state = PlayerState::Idle;
        inner.source = None;
        inner.resume_position = Duration::ZERO;

        backend.set_stream_category(StreamCategory::Music);
        let loaded = backend.set_source(&source).and_then(|_| backend.prepare());
        inner.backend = Some(backend);

        match loaded {
            Ok(()) => {
                log::debug!("prepared {}", source);
                inner.source = Some(source);
                inner.state = PlayerState::Prepared;
                Ok(())
            }
            Err(e) => {
                log::error!("couldn't prepare {}: {}", source, e);
                Err(SessionError::PrepareError(format!(
                    "couldn't prepare {}: {}",
                    source.location(),
                    e
                )))
            }
        }
    }

    fn play_locked(
        &self,
        inner: &mut PlayerInner,
        source: PlaybackSource,
        settings: PlaybackSettings,
        retired: &mut Option<Teardown>,
    ) -> Result<PlayCompletion, SessionError> {
        if inner.state.is_paused() && self.paused_play == PausedPlayPolicy::ResumeExisting {
            log::warn!(
                "play({}) while paused resumes {} instead",
                source.location(),
                inner.location()
            );
            let location = self.unpause_locked(inner)?;
            return Ok(completion::resolved(PlayOutcome::Resumed(location)));
        }

        if inner.state.is_playing() || inner.state.is_paused() {
            // Never reuse the handle: its completion callback belongs to the old play.
            log::debug!("replacing playback of {}", inner.location());
            *retired = Some(inner.teardown(PlayOutcome::Stopped));
        } else {
            inner.release_backend();
        }

        self.apply_route(settings.output);
        self.prepare_locked(inner, source)?;

        let id = Uuid::new_v4();
        let listener = self.completion_listener(id);
        let Some(backend) = inner.backend.as_mut() else {
            return Err(SessionError::not_prepared("no playback backend"));
        };
        backend.set_completion_listener(listener);
        if let Err(e) = backend.start() {
            log::error!("player failed to start: {}", e);
            inner.release_backend();
            return Err(SessionError::BackendFailure(e.to_string()));
        }

        let (resolver, completion) = completion::play_channel();
        inner.playback = Some(ActivePlayback { id, resolver });
        inner.resume_position = Duration::ZERO;
        inner.state = PlayerState::Playing;

        match self.spawn_progress_timer() {
            Ok(timer) => inner.timer = Some(timer),
            Err(e) => {
                inner.teardown(PlayOutcome::Stopped);
                return Err(e);
            }
        }

        log::info!("playback {} started: {}", id, inner.location());
        Ok(completion)
    }

    fn unpause_locked(&self, inner: &mut PlayerInner) -> Result<String, SessionError> {
        if !inner.state.is_paused() {
            log::error!("unpause rejected from {:?}", inner.state);
            return Err(SessionError::invalid_state("call pause before unpausing playback"));
        }

        let position = inner.resume_position;
        let Some(backend) = inner.backend.as_mut() else {
            return Err(SessionError::not_prepared("no playback backend"));
        };
        backend.seek_to(position);
        backend.start().map_err(|e| {
            log::error!("player failed to resume: {}", e);
            SessionError::BackendFailure(e.to_string())
        })?;

        match self.spawn_progress_timer() {
            Ok(timer) => inner.timer = Some(timer),
            Err(e) => {
                let _ = backend.pause();
                return Err(e);
            }
        }
        inner.state = PlayerState::Playing;
        Ok(inner.location())
    }

    /// Best-effort: a missing or failing route falls back to the default.
    fn apply_route(&self, route: Option<OutputRoute>) {
        let Some(route) = route else {
            return;
        };
        let hardware = self.router.hardware_state();
        match route.plan(&hardware) {
            Some(plan) => {
                if let Err(e) = self.router.apply(&plan) {
                    log::warn!("output {} unavailable, using default route: {}", route.name(), e);
                }
            }
            None => log::debug!("output {} uses the default route", route.name()),
        }
    }

    fn completion_listener(&self, id: Uuid) -> CompletionListener {
        let weak: Weak<Mutex<PlayerInner>> = Arc::downgrade(&self.inner);
        let sink = Arc::clone(&self.sink);

        Box::new(move || {
            let Some(session) = weak.upgrade() else {
                return;
            };
            let mut teardown = {
                let mut inner = session.lock();
                if inner.playback.as_ref().map(|p| p.id) != Some(id) {
                    log::debug!("ignoring completion from retired playback {}", id);
                    return;
                }
                let teardown = inner.teardown(PlayOutcome::Completed);
                sink.emit(&SessionEvent::PlayerFinished);
                teardown
            };
            teardown.join_timer();
            if let Err(e) = teardown.stopped {
                log::warn!("player stop after completion failed: {}", e);
            }
            log::info!("playback {} completed: {}", id, teardown.location);
        })
    }

    fn spawn_progress_timer(&self) -> Result<ProgressTimer, SessionError> {
        let weak: Weak<Mutex<PlayerInner>> = Arc::downgrade(&self.inner);
        let sink = Arc::clone(&self.sink);

        ProgressTimer::spawn("player-progress", self.progress_interval, move |token| {
            let Some(session) = weak.upgrade() else {
                token.cancel();
                return;
            };
            let inner = session.lock();
            if token.is_cancelled() || !inner.state.is_playing() {
                return;
            }
            if let Some(backend) = inner.backend.as_ref() {
                sink.emit(&SessionEvent::player_progress(backend.position().as_secs_f64()));
            }
        })
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.discard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::output_route::{AudioMode, RouteState};
    use crate::testing::{CollectingSink, FakeRouter, MockPlaybackEngine};
    use std::thread;

    const WAIT: Duration = Duration::from_secs(5);

    struct Fixture {
        engine: Arc<MockPlaybackEngine>,
        router: Arc<FakeRouter>,
        sink: Arc<CollectingSink>,
        player: PlayerSession,
    }

    fn fixture() -> Fixture {
        let engine = MockPlaybackEngine::new();
        let router = FakeRouter::new();
        let sink = CollectingSink::new();
        let player = PlayerSession::new(engine.clone(), router.clone(), sink.clone())
            .with_progress_interval(Duration::from_millis(20));
        Fixture { engine, router, sink, player }
    }

    #[test]
    fn natural_completion_resolves_and_emits_once() {
        let f = fixture();
        let completion = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        assert_eq!(f.player.state(), PlayerState::Playing);

        assert!(f.engine.complete_latest());

        assert_eq!(
            completion.wait_timeout(WAIT),
            Some(PlayOutcome::Completed("/tmp/a.mp4".into()))
        );
        assert_eq!(f.player.state(), PlayerState::Idle);
        assert_eq!(f.sink.count("playerFinished"), 1);
        assert_eq!(f.engine.log().live_handles(), 0);
        assert_eq!(f.sink.names().last(), Some(&"playerFinished"));
    }

    #[test]
    fn explicit_stop_resolves_once_and_late_completion_is_ignored() {
        let f = fixture();
        let completion = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();

        assert_eq!(f.player.stop().unwrap(), "/tmp/a.mp4");
        assert_eq!(f.player.state(), PlayerState::Idle);

        // Callback already in flight when the handle was stopped.
        f.engine.complete(0);

        assert_eq!(
            completion.wait_timeout(WAIT),
            Some(PlayOutcome::Stopped("/tmp/a.mp4".into()))
        );
        assert_eq!(completion.try_outcome(), None);
        assert_eq!(f.sink.count("playerFinished"), 0);
        assert_eq!(f.engine.log().live_handles(), 0);
    }

    #[test]
    fn play_while_playing_replaces_handle() {
        let f = fixture();
        let first = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        let second = f.player.play("/tmp/b.mp4", PlaybackSettings::default()).unwrap();

        assert_eq!(
            first.wait_timeout(WAIT),
            Some(PlayOutcome::Stopped("/tmp/a.mp4".into()))
        );
        assert_eq!(f.engine.handle_count(), 2);
        assert_eq!(f.engine.log().live_handles(), 1);
        assert_eq!(f.player.state(), PlayerState::Playing);

        // The discarded handle's completion must not finish the new playback.
        f.engine.complete(0);
        assert_eq!(f.player.state(), PlayerState::Playing);
        assert_eq!(f.sink.count("playerFinished"), 0);
        assert_eq!(second.try_outcome(), None);

        assert!(f.engine.complete(1));
        assert_eq!(
            second.wait_timeout(WAIT),
            Some(PlayOutcome::Completed("/tmp/b.mp4".into()))
        );
        assert_eq!(f.sink.count("playerFinished"), 1);
    }

    #[test]
    fn pause_and_unpause_restore_position() {
        let f = fixture();
        let _completion = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        f.engine.set_position(Duration::from_secs(3));

        assert_eq!(f.player.pause().unwrap(), "/tmp/a.mp4");
        assert_eq!(f.player.state(), PlayerState::Paused);

        f.engine.set_position(Duration::ZERO);
        assert_eq!(f.player.unpause().unwrap(), "/tmp/a.mp4");
        assert_eq!(f.player.state(), PlayerState::Playing);
        assert_eq!(f.player.position().unwrap(), Duration::from_secs(3));
        assert_eq!(f.engine.log().seeks.last(), Some(&Duration::from_secs(3)));
    }

    #[test]
    fn wrong_state_commands_are_rejected() {
        let f = fixture();
        assert!(matches!(f.player.pause(), Err(SessionError::InvalidState(_))));
        assert!(matches!(f.player.unpause(), Err(SessionError::InvalidState(_))));
        assert!(matches!(f.player.stop(), Err(SessionError::InvalidState(_))));
        assert_eq!(f.player.state(), PlayerState::Idle);
        assert!(f.sink.events().is_empty());

        let _completion = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        assert!(matches!(f.player.unpause(), Err(SessionError::InvalidState(_))));
        f.player.pause().unwrap();
        assert!(matches!(f.player.pause(), Err(SessionError::InvalidState(_))));
        assert!(matches!(f.player.stop(), Err(SessionError::InvalidState(_))));
        assert_eq!(f.player.state(), PlayerState::Paused);
    }

    #[test]
    fn play_while_paused_resumes_existing_by_default() {
        let f = fixture();
        let first = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        f.player.pause().unwrap();

        let second = f.player.play("/tmp/b.mp4", PlaybackSettings::default()).unwrap();
        assert_eq!(second.try_outcome(), Some(PlayOutcome::Resumed("/tmp/a.mp4".into())));
        assert_eq!(f.player.state(), PlayerState::Playing);
        assert_eq!(f.engine.handle_count(), 1);

        f.engine.complete_latest();
        assert_eq!(
            first.wait_timeout(WAIT),
            Some(PlayOutcome::Completed("/tmp/a.mp4".into()))
        );
    }

    #[test]
    fn play_while_paused_can_restart() {
        let engine = MockPlaybackEngine::new();
        let sink = CollectingSink::new();
        let player = PlayerSession::new(engine.clone(), FakeRouter::new(), sink.clone())
            .with_paused_play(PausedPlayPolicy::Restart);

        let first = player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        player.pause().unwrap();
        let _second = player.play("/tmp/b.mp4", PlaybackSettings::default()).unwrap();

        assert_eq!(
            first.wait_timeout(WAIT),
            Some(PlayOutcome::Stopped("/tmp/a.mp4".into()))
        );
        assert_eq!(
            player.current_source(),
            Some(PlaybackSource::Local("/tmp/b.mp4".into()))
        );
        assert_eq!(engine.log().live_handles(), 1);
    }

    #[test]
    fn seek_requires_backend_and_clamps() {
        let f = fixture();
        assert!(matches!(f.player.seek(1.0), Err(SessionError::NotPrepared(_))));

        f.engine.script(|s| s.duration = Some(Duration::from_secs(30)));
        f.player.prepare(PlaybackSource::Local("/tmp/a.mp4".into())).unwrap();

        f.player.seek(1e9).unwrap();
        assert_eq!(f.player.position().unwrap(), Duration::from_secs(30));

        f.player.seek(-5.0).unwrap();
        assert_eq!(f.player.position().unwrap(), Duration::ZERO);

        f.player.seek(f64::NAN).unwrap();
        f.player.seek(f64::INFINITY).unwrap();
        assert_eq!(f.player.position().unwrap(), Duration::ZERO);
    }

    #[test]
    fn seek_while_paused_moves_resume_point() {
        let f = fixture();
        let _completion = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        f.player.pause().unwrap();
        f.player.seek(7.0).unwrap();
        f.player.unpause().unwrap();
        assert_eq!(f.player.position().unwrap(), Duration::from_secs(7));
    }

    #[test]
    fn prepare_failure_keeps_handle_but_not_prepared() {
        let f = fixture();
        f.engine.script(|s| s.fail_prepare = true);

        let err = f.player.prepare(PlaybackSource::Remote("https://example.com/a.mp3".into()));
        assert!(matches!(err, Err(SessionError::PrepareError(_))));
        assert_eq!(f.player.state(), PlayerState::Idle);
        assert_eq!(f.engine.log().live_handles(), 1);
        assert!(matches!(f.player.seek(1.0), Err(SessionError::NotPrepared(_))));

        f.engine.script(|s| s.fail_prepare = false);
        f.player.prepare(PlaybackSource::Remote("https://example.com/a.mp3".into())).unwrap();
        assert_eq!(f.player.state(), PlayerState::Prepared);
        assert_eq!(f.engine.log().opened, 1);
        assert_eq!(f.engine.log().resets, 1);
    }

    #[test]
    fn play_failure_reports_prepare_error() {
        let f = fixture();
        f.engine.script(|s| s.fail_source = true);

        let err = f.player.play("/missing.mp4", PlaybackSettings::default());
        assert!(matches!(err, Err(SessionError::PrepareError(_))));
        assert_eq!(f.player.state(), PlayerState::Idle);
    }

    #[test]
    fn start_failure_releases_handle() {
        let f = fixture();
        f.engine.script(|s| s.fail_start = true);

        let err = f.player.play("/tmp/a.mp4", PlaybackSettings::default());
        assert!(matches!(err, Err(SessionError::BackendFailure(_))));
        assert_eq!(f.player.state(), PlayerState::Idle);
        assert_eq!(f.engine.log().live_handles(), 0);
    }

    #[test]
    fn play_url_uses_remote_source() {
        let f = fixture();
        let _completion = f
            .player
            .play_url("https://example.com/a.mp3", PlaybackSettings::default())
            .unwrap();
        assert_eq!(
            f.engine.log().sources,
            vec![PlaybackSource::Remote("https://example.com/a.mp3".into())]
        );
    }

    #[test]
    fn output_route_is_applied_best_effort() {
        let f = fixture();
        f.router.set_hardware(RouteState { bluetooth_a2dp: true, ..Default::default() });

        let settings = PlaybackSettings { output: Some(OutputRoute::PhoneSpeaker) };
        let _completion = f.player.play("/tmp/a.mp4", settings).unwrap();
        let applied = f.router.applied();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].mode, AudioMode::InCall);
        assert!(applied[0].speakerphone);

        f.router.set_failing(true);
        let settings = PlaybackSettings { output: Some(OutputRoute::Bluetooth) };
        assert!(f.player.play("/tmp/b.mp4", settings).is_ok());
        assert_eq!(f.player.state(), PlayerState::Playing);
    }

    #[test]
    fn outputs_reflect_hardware() {
        let f = fixture();
        assert_eq!(f.player.outputs(), vec![OutputRoute::Phone, OutputRoute::PhoneSpeaker]);
        f.router.set_hardware(RouteState { wired_headset: true, ..Default::default() });
        assert_eq!(f.player.outputs(), vec![OutputRoute::Headphones]);
    }

    #[test]
    fn duration_queries() {
        let f = fixture();
        assert!(matches!(f.player.duration(), Err(SessionError::NotPrepared(_))));

        f.engine.script(|s| s.duration = Some(Duration::from_secs(12)));
        assert_eq!(f.player.duration_of("/tmp/a.mp4").unwrap(), Some(Duration::from_secs(12)));
        assert_eq!(f.player.state(), PlayerState::Prepared);
        assert_eq!(f.player.duration().unwrap(), Some(Duration::from_secs(12)));

        let _completion = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        assert!(matches!(f.player.duration_of("/tmp/b.mp4"), Err(SessionError::InvalidState(_))));
    }

    #[test]
    fn progress_stops_with_playback() {
        let f = fixture();
        let _completion = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        f.engine.set_position(Duration::from_millis(1500));
        thread::sleep(Duration::from_millis(100));
        assert!(f.sink.count("playerProgress") >= 2);

        f.player.pause().unwrap();
        let paused_at = f.sink.count("playerProgress");
        thread::sleep(Duration::from_millis(80));
        assert_eq!(f.sink.count("playerProgress"), paused_at);

        f.player.unpause().unwrap();
        f.player.stop().unwrap();
        let after_stop = f.sink.events().len();
        thread::sleep(Duration::from_millis(80));
        assert_eq!(f.sink.events().len(), after_stop);

        assert!(f.sink.events().iter().any(|e| *e == SessionEvent::player_progress(1.5)));
    }

    #[test]
    fn no_progress_after_completion() {
        let f = fixture();
        let _completion = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        thread::sleep(Duration::from_millis(50));
        f.engine.complete_latest();

        let names = f.sink.names();
        assert_eq!(names.last(), Some(&"playerFinished"));
        thread::sleep(Duration::from_millis(80));
        assert_eq!(f.sink.names(), names);
    }

    #[test]
    fn discard_resolves_pending_play() {
        let f = fixture();
        let completion = f.player.play("/tmp/a.mp4", PlaybackSettings::default()).unwrap();
        f.player.discard();

        assert_eq!(
            completion.wait_timeout(WAIT),
            Some(PlayOutcome::Stopped("/tmp/a.mp4".into()))
        );
        assert_eq!(f.engine.log().live_handles(), 0);
        assert_eq!(f.player.state(), PlayerState::Idle);
    }
}
