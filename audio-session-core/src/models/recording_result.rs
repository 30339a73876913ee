use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result returned when a recording is stopped and finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingResult {
    pub recording_id: Uuid,
    pub file_path: PathBuf,
    /// Active capture time, excluding paused intervals.
    pub duration_secs: f64,
    pub finished_at: DateTime<Utc>,
}

impl RecordingResult {
    pub fn new(recording_id: Uuid, file_path: PathBuf, duration_secs: f64) -> Self {
        Self {
            recording_id,
            file_path,
            duration_secs,
            finished_at: Utc::now(),
        }
    }

    /// `file://` URL of the output, as reported in `recordingFinished`.
    pub fn audio_file_url(&self) -> String {
        format!("file://{}", self.file_path.to_string_lossy())
    }
}
