//! flakepin - pinned flake dependencies
//!
//! Parses flake references, resolves aliases through layered flake
//! registries, fetches and evaluates flakes, and records every transitive
//! dependency at an exact revision in `flake.lock`.
//!
//! ## Module Organization
//!
//! - `flakeref`: reference model, parser and printer
//! - `registry`: alias to reference maps and their layering
//! - `fetch`, `evaluator`: the seams used to obtain and read a flake
//! - `resolver`: dealiasing, purity checks and the dependency tree
//! - `lockfile`: the lock file model and its updater
//! - `settings`, `cli`, `commands`, `ui`: the command line surface

pub mod cli;
pub mod commands;
pub mod common;
pub mod error;
pub mod evaluator;
pub mod fetch;
pub mod flake;
pub mod flakeref;
pub mod hash;
pub mod lockfile;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod ui;

#[cfg(test)]
mod test_fixtures;
