use clap::Parser;
use std::path::PathBuf;

/// Arguments for the lock command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Update flake.lock in the current directory:\n    flakepin lock\n\n\
                  Update the lock file of another flake:\n    flakepin lock ../my-flake\n\n\
                  Re-resolve every dependency from scratch:\n    flakepin lock --recreate")]
pub struct LockArgs {
    /// Flake directory (defaults to current directory)
    pub dir: Option<PathBuf>,

    /// Ignore the existing lock file and pin every dependency anew
    #[arg(long)]
    pub recreate: bool,
}
