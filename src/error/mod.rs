//! Error types and handling for flakepin
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`flakeref`]: Reference parsing, purity and lookup errors
//! - [`resolve`]: Alias chasing and dependency cycle errors
//! - [`fetch`]: Source fetching errors
//! - [`lockfile`]: Lock file errors
//! - [`registry`]: Registry file errors
//! - [`config`]: Settings errors
//! - [`fs`]: File system errors

pub mod config;
pub mod fetch;
pub mod flakeref;
pub mod fs;
pub mod lockfile;
pub mod registry;
pub mod resolve;


use miette::Diagnostic;
use thiserror::Error;

/// Main error type for flakepin operations
#[derive(Error, Diagnostic, Debug)]
pub enum FlakeError {
    // Reference errors
    #[error("Invalid flake reference '{input}': {reason}")]
    #[diagnostic(
        code(flakepin::flakeref::bad),
        help(
            "Valid formats: <id>(/<ref>)(/<rev>), github:<owner>/<repo>(/<ref-or-rev>), \
             git+https://<host>/<path>(?ref=..&rev=..), /path(?ref=..&rev=..), https://<host>/<file>.tar.xz(?hash=..)"
        )
    )]
    BadFlakeRef { input: String, reason: String },

    #[error("Cannot use mutable flake reference '{flake_ref}' in pure mode")]
    #[diagnostic(
        code(flakepin::flakeref::impure),
        help("Pin the reference to a commit hash, or run 'flakepin lock' to record one")
    )]
    ImpureFlakeRef { flake_ref: String },

    #[error("Could not find flake '{flake_ref}': {reason}")]
    #[diagnostic(
        code(flakepin::flakeref::missing),
        help("Check the flake registry ('flakepin registry list') and that the source is reachable")
    )]
    MissingFlake { flake_ref: String, reason: String },

    // Resolution errors
    #[error("Too many alias indirections while resolving: {chain}")]
    #[diagnostic(
        code(flakepin::registry::alias_loop),
        help("A registry entry refers back to itself; fix the registry with 'flakepin registry remove'")
    )]
    AliasLoop { chain: String },

    #[error("Circular dependency detected: {chain}")]
    #[diagnostic(
        code(flakepin::resolve::circular),
        help("Remove the circular requirement from one of the flakes")
    )]
    CircularDependency { chain: String },

    #[error("Failed to fetch '{url}': {reason}")]
    #[diagnostic(code(flakepin::fetch::failed))]
    FetchFailed { url: String, reason: String },

    #[error("Failed to evaluate flake '{flake_ref}': {reason}")]
    #[diagnostic(code(flakepin::eval::failed))]
    EvaluationFailed { flake_ref: String, reason: String },

    // Lock file errors
    #[error("Failed to parse lock file: {path}: {reason}")]
    #[diagnostic(code(flakepin::lockfile::parse_failed))]
    LockfileParseFailed { path: String, reason: String },

    #[error("Lock file entry '{id}' is not pinned: {flake_ref}")]
    #[diagnostic(
        code(flakepin::lockfile::unpinned),
        help("Every locked flake must carry a commit or content hash")
    )]
    LockfileUnpinned { id: String, flake_ref: String },

    // Registry errors
    #[error("Failed to parse flake registry: {path}: {reason}")]
    #[diagnostic(code(flakepin::registry::parse_failed))]
    RegistryParseFailed { path: String, reason: String },

    // Configuration errors
    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(flakepin::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(flakepin::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(flakepin::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(flakepin::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(flakepin::fs::io_error))]
    IoError { message: String },

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(flakepin::git::operation_failed))]
    GitOperationFailed { message: String },
}

impl FlakeError {
    /// Whether this error belongs to the bad-reference family.
    ///
    /// `MissingFlake` and `ImpureFlakeRef` are refinements of `BadFlakeRef`:
    /// callers that only care about "the reference could not be used" can
    /// match all three through this predicate.
    pub fn is_bad_flake_ref(&self) -> bool {
        matches!(
            self,
            FlakeError::BadFlakeRef { .. }
                | FlakeError::ImpureFlakeRef { .. }
                | FlakeError::MissingFlake { .. }
        )
    }
}

impl From<std::io::Error> for FlakeError {
    fn from(err: std::io::Error) -> Self {
        FlakeError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for FlakeError {
    fn from(err: serde_yaml::Error) -> Self {
        FlakeError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FlakeError {
    fn from(err: serde_json::Error) -> Self {
        FlakeError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for FlakeError {
    fn from(err: git2::Error) -> Self {
        FlakeError::GitOperationFailed {
            message: err.message().to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, FlakeError>;
