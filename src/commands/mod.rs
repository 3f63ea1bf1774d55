//! Command implementations for flakepin CLI

pub mod completions;
pub mod helpers;
pub mod info;
pub mod inspect;
pub mod lock;
pub mod registry;
pub mod resolve;
pub mod version;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use crate::settings::Overrides;

/// Run the parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        jobs: cli.jobs,
        registry: cli.registry,
    };

    match cli.command {
        Commands::Inspect(args) => inspect::run(args),
        Commands::Info(args) => info::run(&overrides, args),
        Commands::Resolve(args) => resolve::run(&overrides, args),
        Commands::Lock(args) => lock::run(&overrides, args),
        Commands::Registry(args) => registry::run(&overrides, args),
        Commands::Version => version::run(),
        Commands::Completions(args) => completions::run(args),
    }
}
