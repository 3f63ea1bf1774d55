//! Readable git error messages

use git2::{Error, ErrorClass};

/// Describe a libgit2 error in terms of what went wrong for the user
pub fn describe_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();
    let contains_any = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

    if contains_any(&["not found", "404", "too many redirects"]) {
        "repository not found".to_string()
    } else if contains_any(&["authentication", "credentials"]) {
        "authentication failed".to_string()
    } else if contains_any(&["permission denied", "access denied"]) {
        "permission denied".to_string()
    } else if contains_any(&["connection", "network", "timed out", "timeout"]) {
        format!("network error: {}", err.message())
    } else {
        match err.class() {
            ErrorClass::Http => format!("HTTP error: {}", err.message()),
            ErrorClass::Ssh => format!("SSH error: {}", err.message()),
            _ => err.message().to_string(),
        }
    }
}
