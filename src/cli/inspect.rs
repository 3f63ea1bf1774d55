use clap::Parser;

/// Arguments for the inspect command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Inspect a GitHub reference:\n    flakepin inspect github:edolstra/dwarffs/unstable\n\n\
                  Inspect a pinned alias:\n    flakepin inspect nixpkgs/release-19.09\n\n\
                  Inspect a relative path:\n    flakepin inspect ./my-flake --relative")]
pub struct InspectArgs {
    /// Flake reference to parse
    pub flake_ref: String,

    /// Accept relative paths such as ./foo or ..
    #[arg(long)]
    pub relative: bool,
}
