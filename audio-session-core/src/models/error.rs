use thiserror::Error;

/// Errors returned by recorder and player session commands.
///
/// Every state-machine violation is detected before the backend is touched,
/// so a rejected command leaves the session exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Command issued in the wrong lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// No backend handle has been prepared.
    #[error("not prepared: {0}")]
    NotPrepared(String),

    /// The backend rejected the encoding/output parameters.
    #[error("configuration failed: {0}")]
    ConfigurationError(String),

    /// Backend prepare or data-source setup failed.
    #[error("prepare failed: {0}")]
    PrepareError(String),

    /// The backend lacks the requested capability.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Runtime failure while driving or finalizing the backend.
    #[error("backend failure: {0}")]
    BackendFailure(String),

    #[error("permission denied")]
    PermissionDenied,
}

impl SessionError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn not_prepared(message: impl Into<String>) -> Self {
        Self::NotPrepared(message.into())
    }
}

/// Failure reported by a platform backend.
///
/// Sessions convert it into the matching [`SessionError`] at each call site.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        Self(e.to_string())
    }
}
