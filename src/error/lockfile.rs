//! Lock file errors

use std::path::Path;

use super::FlakeError;

/// Creates a lock file parse error
pub fn parse_failed(path: &Path, reason: impl Into<String>) -> FlakeError {
    FlakeError::LockfileParseFailed {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Creates an error for a lock entry without a pin
pub fn unpinned(id: impl Into<String>, flake_ref: impl ToString) -> FlakeError {
    FlakeError::LockfileUnpinned {
        id: id.into(),
        flake_ref: flake_ref.to_string(),
    }
}
