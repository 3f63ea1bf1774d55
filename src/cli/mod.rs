//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - inspect: Inspect command arguments
//! - info: Info and resolve command arguments
//! - lock: Lock command arguments
//! - registry: Registry command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod info;
pub mod inspect;
pub mod lock;
pub mod registry;

pub use completions::CompletionsArgs;
pub use info::{InfoArgs, ResolveArgs};
pub use inspect::InspectArgs;
pub use lock::LockArgs;
pub use registry::{AddEntryArgs, RegistryArgs, RegistrySubcommand, RemoveEntryArgs};

/// flakepin - pin flake dependencies
///
/// Resolve flake references through registries and record every dependency
/// at an exact revision in flake.lock.
#[derive(Parser, Debug)]
#[command(
    name = "flakepin",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Resolve flake references and pin their dependencies",
    long_about = "flakepin parses flake references, resolves aliases through flake registries, \
                  fetches flakes with Git and records the exact revision of every dependency \
                  in a reproducible flake.lock.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  flakepin inspect nixpkgs/release-19.09  \x1b[90m# Show how a reference parses\x1b[0m\n   \
                  flakepin info . --impure                \x1b[90m# Show the flake in this directory\x1b[0m\n   \
                  flakepin resolve . --impure             \x1b[90m# Print the dependency tree\x1b[0m\n   \
                  flakepin lock                           \x1b[90m# Write flake.lock\x1b[0m\n   \
                  flakepin registry add nixpkgs github:NixOS/nixpkgs\n\n\
                  "
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Number of dependencies resolved in parallel
    #[arg(long, short = 'j', global = true)]
    pub jobs: Option<usize>,

    /// Extra registry file consulted before the user registry
    #[arg(long, global = true, value_name = "FILE")]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a flake reference and show its parts
    Inspect(InspectArgs),

    /// Fetch a flake and show its metadata
    Info(InfoArgs),

    /// Resolve a flake and print its dependency tree
    Resolve(ResolveArgs),

    /// Create or update flake.lock
    Lock(LockArgs),

    /// Manage the user flake registry
    Registry(RegistryArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
