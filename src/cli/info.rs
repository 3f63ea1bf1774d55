use clap::Parser;

/// Arguments for the info command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show a pinned flake:\n    flakepin info github:edolstra/dwarffs/e72daba8250068216d79d2aeef40d4d95aff6666\n\n\
                  Show the flake in the current directory:\n    flakepin info . --impure\n\n\
                  Show the flake an alias points to:\n    flakepin info nixpkgs --impure")]
pub struct InfoArgs {
    /// Flake reference; relative paths are resolved against the current directory
    pub flake_ref: String,

    /// Allow references that are not pinned to a revision
    #[arg(long)]
    pub impure: bool,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Resolve the flake in the current directory using its lock file:\n    flakepin resolve . --impure\n\n\
                  Resolve ignoring lock files:\n    flakepin resolve . --impure --no-lock")]
pub struct ResolveArgs {
    /// Flake reference; relative paths are resolved against the current directory
    pub flake_ref: String,

    /// Allow the top flake reference to be unpinned
    #[arg(long)]
    pub impure: bool,

    /// Ignore pins recorded in lock files
    #[arg(long)]
    pub no_lock: bool,
}
