//! Configuration errors

use std::path::Path;

use super::FlakeError;

pub fn parse_failed(path: &Path, reason: impl Into<String>) -> FlakeError {
    FlakeError::ConfigParseFailed {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

pub fn invalid(message: impl Into<String>) -> FlakeError {
    FlakeError::ConfigInvalid {
        message: message.into(),
    }
}
