//! # audio-session-core
//!
//! Platform-agnostic record/playback session core.
//!
//! Provides the recorder and player state machines, their progress timers,
//! and the event model pushed to the host. Platform backends implement the
//! `RecordingEngine` / `PlaybackEngine` traits and plug into the sessions.
//!
//! ## Architecture
//!
//! ```text
//! audio-session-core (this crate)
//! ├── traits/       ← RecordingEngine, PlaybackEngine, AudioRouter, EventSink
//! ├── models/       ← SessionError, RecorderState, PlayerState, RecordingConfig, SessionEvent, etc.
//! ├── timing/       ← StopWatch, ProgressTimer, CancellationToken
//! ├── session/      ← RecorderSession, PlayerSession, PlayCompletion
//! └── storage/      ← inline base64 payload
//! ```

pub mod models;
pub mod session;
pub mod storage;
pub mod timing;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::{
    AudioEncoder, AudioInput, ContainerFormat, PlaybackSettings, PlaybackSource, RecordingConfig,
};
pub use models::error::{BackendError, SessionError};
pub use models::events::{ProgressPayload, RecordingFinishedPayload, SessionEvent};
pub use models::output_route::{AudioMode, OutputRoute, RoutePlan, RouteState};
pub use models::recording_result::RecordingResult;
pub use models::state::{PlayerState, RecorderState};
pub use session::completion::{PlayCompletion, PlayOutcome};
pub use session::player::{PausedPlayPolicy, PlayerSession};
pub use session::recorder::{PauseFallback, RecorderSession};
pub use timing::progress_timer::{CancellationToken, ProgressTimer};
pub use timing::stop_watch::StopWatch;
pub use traits::audio_router::AudioRouter;
pub use traits::event_sink::EventSink;
pub use traits::playback_backend::{CompletionListener, PlaybackBackend, PlaybackEngine, StreamCategory};
pub use traits::recording_backend::{RecordingBackend, RecordingEngine};
