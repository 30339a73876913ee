use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::output_route::OutputRoute;

/// Capture source handed to the recording backend.
///
/// Codes match the platform's audio-source constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioInput {
    #[default]
    Default,
    Mic,
    VoiceUplink,
    VoiceDownlink,
    VoiceCall,
    Camcorder,
    VoiceRecognition,
    VoiceCommunication,
    RemoteSubmix,
    Unprocessed,
}

impl AudioInput {
    const ALL: [AudioInput; 10] = [
        Self::Default,
        Self::Mic,
        Self::VoiceUplink,
        Self::VoiceDownlink,
        Self::VoiceCall,
        Self::Camcorder,
        Self::VoiceRecognition,
        Self::VoiceCommunication,
        Self::RemoteSubmix,
        Self::Unprocessed,
    ];

    pub fn code(&self) -> i32 {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0) as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code).ok().and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Container the recording is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    #[default]
    #[serde(rename = "mpeg_4")]
    Mpeg4,
    AacAdts,
    AmrNb,
    AmrWb,
    ThreeGpp,
    Webm,
    /// Whatever the backend picks when no known format was requested.
    BackendDefault,
}

impl ContainerFormat {
    /// Parse a host-supplied format name, falling back to the backend default.
    pub fn from_name(name: &str) -> Self {
        match name {
            "mpeg_4" => Self::Mpeg4,
            "aac_adts" => Self::AacAdts,
            "amr_nb" => Self::AmrNb,
            "amr_wb" => Self::AmrWb,
            "three_gpp" => Self::ThreeGpp,
            "webm" => Self::Webm,
            other => {
                log::debug!("unknown output format {:?}, using backend default", other);
                Self::BackendDefault
            }
        }
    }
}

/// Audio codec used by the recording backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEncoder {
    #[default]
    Aac,
    AacEld,
    AmrNb,
    AmrWb,
    HeAac,
    Vorbis,
    BackendDefault,
}

impl AudioEncoder {
    /// Parse a host-supplied encoder name, falling back to the backend default.
    pub fn from_name(name: &str) -> Self {
        match name {
            "aac" => Self::Aac,
            "aac_eld" => Self::AacEld,
            "amr_nb" => Self::AmrNb,
            "amr_wb" => Self::AmrWb,
            "he_aac" => Self::HeAac,
            "vorbis" => Self::Vorbis,
            other => {
                log::debug!("unknown audio encoder {:?}, using backend default", other);
                Self::BackendDefault
            }
        }
    }
}

/// Parameters for a recording. Frozen once `prepare` succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    pub source: AudioInput,

    pub container_format: ContainerFormat,

    pub audio_encoder: AudioEncoder,

    /// Sample rate in Hz (default: 44100).
    pub sample_rate_hz: u32,

    /// 1 = mono, 2 = stereo (default: 2).
    pub channel_count: u16,

    /// Encoder bit rate in bits per second (default: 32000).
    pub bit_rate_bps: u32,

    /// File the backend writes to. Filled in by `RecorderSession::prepare`.
    pub output_path: PathBuf,

    /// Attach the base64-encoded file to the `recordingFinished` event.
    pub include_inline_payload: bool,
}

impl RecordingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate_hz == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![1, 2].contains(&self.channel_count) {
            return Err(format!("unsupported channel count: {}", self.channel_count));
        }
        if self.bit_rate_bps == 0 {
            return Err("bit rate must be positive".into());
        }
        if self.output_path.as_os_str().is_empty() {
            return Err("output path must not be empty".into());
        }
        Ok(())
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            source: AudioInput::Default,
            container_format: ContainerFormat::Mpeg4,
            audio_encoder: AudioEncoder::Aac,
            sample_rate_hz: 44_100,
            channel_count: 2,
            bit_rate_bps: 32_000,
            output_path: PathBuf::new(),
            include_inline_payload: false,
        }
    }
}

/// Where a playback reads its media from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "lowercase")]
pub enum PlaybackSource {
    Local(PathBuf),
    Remote(String),
}

impl PlaybackSource {
    /// The path or URL as handed back to the host.
    pub fn location(&self) -> String {
        match self {
            Self::Local(path) => path.to_string_lossy().into_owned(),
            Self::Remote(url) => url.clone(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for PlaybackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "local:{}", path.display()),
            Self::Remote(url) => write!(f, "remote:{}", url),
        }
    }
}

/// Per-play settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Requested output route, applied once when playback starts.
    pub output: Option<OutputRoute>,
}
