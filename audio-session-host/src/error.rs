use std::fmt;

use serde::Serialize;
use thiserror::Error;

use audio_session_core::SessionError;

/// Stable error codes handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidState,
    RecordingNotPrepared,
    PlayerNotPrepared,
    CouldntConfigureMediaRecorder,
    CouldntPrepareRecordingAtPath,
    #[serde(rename = "COULDNT_PREPARE_MEDIAPLAYER")]
    CouldntPrepareMediaPlayer,
    UnsupportedOperation,
    RuntimeException,
    PermissionDenied,
    InvalidPath,
    NoSession,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidState => "INVALID_STATE",
            Self::RecordingNotPrepared => "RECORDING_NOT_PREPARED",
            Self::PlayerNotPrepared => "PLAYER_NOT_PREPARED",
            Self::CouldntConfigureMediaRecorder => "COULDNT_CONFIGURE_MEDIA_RECORDER",
            Self::CouldntPrepareRecordingAtPath => "COULDNT_PREPARE_RECORDING_AT_PATH",
            Self::CouldntPrepareMediaPlayer => "COULDNT_PREPARE_MEDIAPLAYER",
            Self::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            Self::RuntimeException => "RUNTIME_EXCEPTION",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::InvalidPath => "INVALID_PATH",
            Self::NoSession => "NO_SESSION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected host command: stable code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{code}: {message}")]
pub struct HostError {
    pub code: ErrorCode,
    pub message: String,
}

impl HostError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn no_session() -> Self {
        Self::new(ErrorCode::NoSession, "audio host is not initialised")
    }

    /// Map a failure from the recorder session.
    pub fn recorder(err: SessionError) -> Self {
        let code = match &err {
            SessionError::NotPrepared(_) => ErrorCode::RecordingNotPrepared,
            SessionError::ConfigurationError(_) => ErrorCode::CouldntConfigureMediaRecorder,
            SessionError::PrepareError(_) => ErrorCode::CouldntPrepareRecordingAtPath,
            other => Self::common_code(other),
        };
        Self::new(code, err.to_string())
    }

    /// Map a failure from the player session.
    pub fn player(err: SessionError) -> Self {
        let code = match &err {
            SessionError::NotPrepared(_) => ErrorCode::PlayerNotPrepared,
            SessionError::ConfigurationError(_) | SessionError::PrepareError(_) => {
                ErrorCode::CouldntPrepareMediaPlayer
            }
            other => Self::common_code(other),
        };
        Self::new(code, err.to_string())
    }

    fn common_code(err: &SessionError) -> ErrorCode {
        match err {
            SessionError::InvalidState(_) => ErrorCode::InvalidState,
            SessionError::UnsupportedOperation(_) => ErrorCode::UnsupportedOperation,
            SessionError::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::RuntimeException,
        }
    }
}
