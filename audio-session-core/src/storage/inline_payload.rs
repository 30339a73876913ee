use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::models::error::SessionError;

/// Read a finished recording and encode it as standard base64.
pub fn encode_file(path: &Path) -> Result<String, SessionError> {
    let bytes = fs::read(path).map_err(|e| {
        SessionError::BackendFailure(format!("failed to read {}: {}", path.display(), e))
    })?;
    Ok(STANDARD.encode(bytes))
}

/// Best-effort variant used for `recordingFinished`: failures are logged and
/// yield an empty payload.
pub fn encode_file_or_empty(path: &Path) -> String {
    match encode_file(path) {
        Ok(encoded) => encoded,
        Err(e) => {
            log::error!("inline payload unavailable: {}", e);
            String::new()
        }
    }
}
