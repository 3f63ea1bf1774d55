//! Registry errors

use std::path::Path;

use super::FlakeError;

/// Creates a registry parse error
pub fn parse_failed(path: &Path, reason: impl Into<String>) -> FlakeError {
    FlakeError::RegistryParseFailed {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}
