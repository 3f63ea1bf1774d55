//! Flake reference errors

use super::FlakeError;

/// Creates a malformed-reference error
pub fn bad_ref(input: impl Into<String>, reason: impl Into<String>) -> FlakeError {
    FlakeError::BadFlakeRef {
        input: input.into(),
        reason: reason.into(),
    }
}

/// Creates a purity violation error
pub fn impure(flake_ref: impl ToString) -> FlakeError {
    FlakeError::ImpureFlakeRef {
        flake_ref: flake_ref.to_string(),
    }
}

/// Creates an error for a reference that could not be located or fetched
pub fn missing(flake_ref: impl ToString, reason: impl Into<String>) -> FlakeError {
    FlakeError::MissingFlake {
        flake_ref: flake_ref.to_string(),
        reason: reason.into(),
    }
}
