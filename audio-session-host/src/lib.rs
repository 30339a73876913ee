//! # audio-session-host
//!
//! Host-facing command surface for audio-session-core.
//!
//! Provides:
//! - `AudioHost`: owns one recorder and one player session between `init` and `teardown`
//! - `HostError`: stable error codes for every rejected command
//! - `RecordingOptions` / `PlaybackOptions`: host option maps parsed with serde
//! - `ChannelEventSink`: forwards session events to the host over a channel
//! - `permissions`: microphone permission precheck
//! - `init_logging`: `env_logger` setup
//!
//! ## Usage
//! ```ignore
//! use audio_session_host::{AudioHost, ChannelEventSink, HostBackends, RecordingOptions};
//!
//! let (sink, events) = ChannelEventSink::new();
//! let host = AudioHost::new(backends, sink);
//! host.init();
//! host.prepare_recording("/tmp/a.mp4", &RecordingOptions::default())?;
//! host.start_recording()?;
//! ```

pub mod error;
pub mod event_channel;
pub mod host;
pub mod logging;
pub mod permissions;
pub mod settings;

pub use error::{ErrorCode, HostError};
pub use event_channel::{ChannelEventSink, HostEvent};
pub use host::{AudioHost, HostBackends, SessionPolicies};
pub use logging::init_logging;
pub use permissions::{FixedPermission, PermissionProbe, Unrestricted};
pub use settings::{PlaybackOptions, RecordingOptions};
