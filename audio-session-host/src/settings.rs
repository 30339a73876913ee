use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use audio_session_core::{
    AudioEncoder, AudioInput, ContainerFormat, OutputRoute, PlaybackSettings, RecordingConfig,
};

use crate::error::{ErrorCode, HostError};

/// Recording option map as sent by the host. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RecordingOptions {
    pub sample_rate: u32,
    pub channels: u16,
    pub audio_encoding: String,
    pub output_format: String,
    pub audio_encoding_bit_rate: u32,
    pub include_base64: bool,
    /// Platform audio-source code.
    pub audio_source: i32,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            audio_encoding: "aac".into(),
            output_format: "mpeg_4".into(),
            audio_encoding_bit_rate: 32_000,
            include_base64: false,
            audio_source: 0,
        }
    }
}

impl RecordingOptions {
    pub fn from_value(value: Value) -> Result<Self, HostError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| {
            HostError::new(
                ErrorCode::CouldntConfigureMediaRecorder,
                format!("invalid recording options: {}", e),
            )
        })
    }

    /// Build the session config. `output_path` is filled in by `prepare`.
    pub fn to_config(&self) -> RecordingConfig {
        let source = AudioInput::from_code(self.audio_source).unwrap_or_else(|| {
            log::debug!("unknown audio source {}, using default", self.audio_source);
            AudioInput::Default
        });

        RecordingConfig {
            source,
            container_format: ContainerFormat::from_name(&self.output_format),
            audio_encoder: AudioEncoder::from_name(&self.audio_encoding),
            sample_rate_hz: self.sample_rate,
            channel_count: self.channels,
            bit_rate_bps: self.audio_encoding_bit_rate,
            output_path: PathBuf::new(),
            include_inline_payload: self.include_base64,
        }
    }
}

/// Playback option map as sent by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackOptions {
    /// Route name such as `"Phone Speaker"`.
    pub output: Option<String>,
}

impl PlaybackOptions {
    pub fn from_value(value: Value) -> Result<Self, HostError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| {
            HostError::new(
                ErrorCode::CouldntPrepareMediaPlayer,
                format!("invalid playback options: {}", e),
            )
        })
    }

    /// Unknown route names are dropped: routing is best-effort.
    pub fn to_settings(&self) -> PlaybackSettings {
        let output = self.output.as_deref().and_then(|name| {
            let route = OutputRoute::from_name(name);
            if route.is_none() {
                log::warn!("unknown output route {:?}, using default route", name);
            }
            route
        });
        PlaybackSettings { output }
    }
}
