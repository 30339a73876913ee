use serde::Serialize;
use serde_json::Value;

/// Status string carried by a successful `recordingFinished` event.
pub const STATUS_OK: &str = "OK";

/// Notifications pushed from a session to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SessionEvent {
    RecordingProgress(ProgressPayload),
    RecordingFinished(RecordingFinishedPayload),
    PlayerProgress(ProgressPayload),
    PlayerFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPayload {
    /// Seconds of elapsed recording time or playback position.
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingFinishedPayload {
    pub status: String,
    #[serde(rename = "audioFileURL")]
    pub audio_file_url: String,
    /// Empty unless the recording asked for an inline payload.
    pub base64: String,
}

impl SessionEvent {
    pub fn recording_progress(secs: f64) -> Self {
        Self::RecordingProgress(ProgressPayload { current_time: secs })
    }

    pub fn player_progress(secs: f64) -> Self {
        Self::PlayerProgress(ProgressPayload { current_time: secs })
    }

    /// Event name as seen by the host.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RecordingProgress(_) => "recordingProgress",
            Self::RecordingFinished(_) => "recordingFinished",
            Self::PlayerProgress(_) => "playerProgress",
            Self::PlayerFinished => "playerFinished",
        }
    }

    /// Event body as a JSON value (`null` for events without a body).
    pub fn payload(&self) -> Value {
        match self {
            Self::PlayerFinished => Value::Null,
            other => serde_json::to_value(other).unwrap_or(Value::Null),
        }
    }

    pub fn is_progress(&self) -> bool {
        matches!(self, Self::RecordingProgress(_) | Self::PlayerProgress(_))
    }
}
