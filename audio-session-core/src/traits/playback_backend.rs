use std::time::Duration;

use crate::models::config::PlaybackSource;
use crate::models::error::BackendError;

/// Invoked once by the backend when the stream reaches its end.
///
/// Must be called from a backend-owned thread, never from inside a call the
/// session is making on the backend.
pub type CompletionListener = Box<dyn FnOnce() + Send + 'static>;

/// Stream category the backend should play under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCategory {
    Music,
}

/// One live decode-and-render handle supplied by the platform.
pub trait PlaybackBackend: Send {
    /// Return the handle to its freshly-opened state.
    fn reset(&mut self);

    fn set_stream_category(&mut self, category: StreamCategory);

    /// Point the handle at a local file or remote URI.
    fn set_source(&mut self, source: &PlaybackSource) -> Result<(), BackendError>;

    /// Load enough of the source to start. May block on network sources.
    fn prepare(&mut self) -> Result<(), BackendError>;

    /// Register the end-of-stream listener, replacing any previous one.
    fn set_completion_listener(&mut self, listener: CompletionListener);

    /// Start or continue rendering.
    fn start(&mut self) -> Result<(), BackendError>;

    fn pause(&mut self) -> Result<(), BackendError>;

    fn stop(&mut self) -> Result<(), BackendError>;

    /// Jump to `position`. Out-of-range handling is backend-defined.
    fn seek_to(&mut self, position: Duration);

    fn position(&self) -> Duration;

    /// Total length of the prepared source, if known.
    fn duration(&self) -> Option<Duration>;

    /// Free the underlying decoder and output. Must not fail.
    fn release(&mut self);
}

/// Factory for [`PlaybackBackend`] handles.
pub trait PlaybackEngine: Send + Sync {
    fn open(&self) -> Result<Box<dyn PlaybackBackend>, BackendError>;
}
