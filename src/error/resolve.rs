//! Resolution errors

use super::FlakeError;

/// Creates a circular dependency error from the active resolution path
pub fn circular<S: AsRef<str>>(path: &[S], repeated: &str) -> FlakeError {
    let mut chain: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
    chain.push(repeated);
    FlakeError::CircularDependency {
        chain: chain.join(" -> "),
    }
}

/// Creates an alias loop error from the visited references
pub fn alias_loop<S: AsRef<str>>(visited: &[S]) -> FlakeError {
    FlakeError::AliasLoop {
        chain: visited
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" -> "),
    }
}

/// Wraps an evaluator failure with the offending reference
pub fn evaluation_failed(flake_ref: impl ToString, reason: impl Into<String>) -> FlakeError {
    FlakeError::EvaluationFailed {
        flake_ref: flake_ref.to_string(),
        reason: reason.into(),
    }
}
