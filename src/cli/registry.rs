use clap::{Parser, Subcommand};

/// Arguments for registry command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List registry entries:\n    flakepin registry list\n\n\
                  Point an alias at a repository:\n    flakepin registry add nixpkgs github:NixOS/nixpkgs\n\n\
                  Remove an alias:\n    flakepin registry remove nixpkgs")]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub command: RegistrySubcommand,
}

/// Registry subcommands
#[derive(Subcommand, Debug)]
pub enum RegistrySubcommand {
    /// List the entries of every configured registry
    List,

    /// Add or replace an entry in the user registry
    Add(AddEntryArgs),

    /// Remove an entry from the user registry
    Remove(RemoveEntryArgs),
}

/// Arguments for registry add command
#[derive(Parser, Debug)]
pub struct AddEntryArgs {
    /// Reference to redirect, usually an alias
    pub from: String,

    /// Reference it resolves to
    pub to: String,
}

/// Arguments for registry remove command
#[derive(Parser, Debug)]
pub struct RemoveEntryArgs {
    /// Reference whose entry is removed
    pub from: String,
}
