use serde::{Deserialize, Serialize};

/// Recorder session state machine.
///
/// State transitions:
/// ```text
/// idle → prepared → recording ↔ paused
///   ↑                   ↓         ↓
///   └──────────────── stop ───────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    #[default]
    Idle,
    Prepared,
    Recording,
    Paused,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Recording or paused: a capture is in progress and must be stopped.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Recording | Self::Paused)
    }
}

/// Player session state machine.
///
/// State transitions:
/// ```text
/// idle → prepared → playing ↔ paused
///   ↑                  ↓
///   └─── stop / end-of-stream
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    #[default]
    Idle,
    Prepared,
    Playing,
    Paused,
}

impl PlayerState {
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Whether a prepared backend handle is reachable for seek/duration queries.
    pub fn has_prepared_backend(&self) -> bool {
        matches!(self, Self::Prepared | Self::Playing | Self::Paused)
    }
}
