use crate::models::config::RecordingConfig;
use crate::models::error::BackendError;

/// One live capture-to-file handle supplied by the platform.
///
/// A session owns at most one handle at a time and always calls
/// [`release`](RecordingBackend::release) before dropping it.
pub trait RecordingBackend: Send {
    /// Apply source, container, encoder, rate, channel, bit-rate and output path.
    fn configure(&mut self, config: &RecordingConfig) -> Result<(), BackendError>;

    /// Open the output and ready the encoder.
    fn prepare(&mut self) -> Result<(), BackendError>;

    /// Begin capturing.
    fn start(&mut self) -> Result<(), BackendError>;

    /// Suspend capture. Only called when the engine reports `supports_pause`.
    fn pause(&mut self) -> Result<(), BackendError>;

    /// Continue a suspended capture.
    fn resume(&mut self) -> Result<(), BackendError>;

    /// Stop capturing and finalize the output file.
    ///
    /// Fails when nothing usable was captured (e.g. zero-length recording).
    fn stop(&mut self) -> Result<(), BackendError>;

    /// Free the underlying device resources. Must not fail.
    fn release(&mut self);
}

/// Factory for [`RecordingBackend`] handles plus the static capability set.
pub trait RecordingEngine: Send + Sync {
    /// Whether handles support pause/resume. Read once per session.
    fn supports_pause(&self) -> bool;

    /// Allocate a fresh, unconfigured handle.
    fn open(&self) -> Result<Box<dyn RecordingBackend>, BackendError>;
}
