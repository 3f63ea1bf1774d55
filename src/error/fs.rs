//! File system errors

use std::path::Path;

use super::FlakeError;

pub fn read_failed(path: &Path, err: impl ToString) -> FlakeError {
    FlakeError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

pub fn write_failed(path: &Path, err: impl ToString) -> FlakeError {
    FlakeError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

pub fn io_error(message: impl Into<String>) -> FlakeError {
    FlakeError::IoError {
        message: message.into(),
    }
}
