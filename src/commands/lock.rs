//! Lock command

use console::Style;

use crate::cli::LockArgs;
use crate::error::Result;
use crate::lockfile::{LockFileUpdater, UpdateOptions};
use crate::settings::Overrides;

use super::helpers::{build_resolver, resolve_dir};

/// Create or update flake.lock of a local flake
pub fn run(overrides: &Overrides, args: LockArgs) -> Result<()> {
    let dir = resolve_dir(args.dir)?;
    let resolver = build_resolver(overrides, true)?;

    let update = LockFileUpdater::new(&resolver)
        .with_options(UpdateOptions {
            recreate: args.recreate,
        })
        .update_at(&dir)?;

    if update.written {
        println!(
            "{} {}",
            Style::new().green().bold().apply_to("Updated"),
            update.path.display()
        );
    } else {
        println!("{} is up to date", update.path.display());
    }
    Ok(())
}
