//! Fetch errors

use super::FlakeError;

/// Creates a fetch failure for a URL or path
pub fn fetch_failed(url: impl ToString, reason: impl Into<String>) -> FlakeError {
    FlakeError::FetchFailed {
        url: url.to_string(),
        reason: reason.into(),
    }
}
