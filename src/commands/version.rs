//! Version command

use crate::error::Result;
use crate::lockfile::serialization::LOCK_FILE_VERSION;
use crate::registry::serialization::REGISTRY_VERSION;

/// Print the version and the file format versions this build reads and writes
pub fn run() -> Result<()> {
    println!("flakepin {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Minimum Rust: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("  Profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });
    println!();
    println!("Formats:");
    println!("  flake.lock: version {LOCK_FILE_VERSION}");
    println!("  registry: version {REGISTRY_VERSION}");
    Ok(())
}
