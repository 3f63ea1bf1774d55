//! flakepin - resolve flake references and pin their dependencies

use clap::Parser;
use tracing_subscriber::EnvFilter;

use flakepin::cli::Cli;
use flakepin::commands;

fn init_tracing(verbose: bool) {
    let default = if verbose { "flakepin=debug" } else { "flakepin=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = commands::run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
