//! Microphone permission precheck.
//!
//! Prompting the user is the platform's job. The host only asks whether
//! access is currently granted, before a recording is prepared.

use audio_session_core::SessionError;

/// Platform hook answering "may this app use the microphone right now?".
pub trait PermissionProbe: Send + Sync {
    /// `Ok(false)` when access is denied. `Err` when the platform could not
    /// be queried at all.
    fn check_microphone_permission(&self) -> Result<bool, SessionError>;
}

/// Probe for platforms where capture is unrestricted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl PermissionProbe for Unrestricted {
    fn check_microphone_permission(&self) -> Result<bool, SessionError> {
        Ok(true)
    }
}

/// Probe with a fixed answer, for hosts that resolve permission up front.
#[derive(Debug, Clone, Copy)]
pub struct FixedPermission(pub bool);

impl PermissionProbe for FixedPermission {
    fn check_microphone_permission(&self) -> Result<bool, SessionError> {
        Ok(self.0)
    }
}
