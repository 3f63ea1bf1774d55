//! Registry command

use crate::cli::{RegistryArgs, RegistrySubcommand};
use crate::error::Result;
use crate::error::flakeref::missing;
use crate::flakeref::FlakeRef;
use crate::registry::FlakeRegistry;
use crate::settings::{Overrides, Settings};
use crate::ui::display::render_registries;

pub fn run(overrides: &Overrides, args: RegistryArgs) -> Result<()> {
    let settings = Settings::load(overrides)?;

    match args.command {
        RegistrySubcommand::List => {
            print!("{}", render_registries(&settings.registries()?));
        }
        RegistrySubcommand::Add(entry) => {
            let from: FlakeRef = entry.from.parse()?;
            let to = FlakeRef::parse(&entry.to, false)?;

            let mut registry = FlakeRegistry::read(&settings.user_registry)?;
            registry.add(from.clone(), to.clone());
            registry.write(&settings.user_registry)?;
            tracing::info!(from = %from, to = %to, path = %settings.user_registry.display(), "added registry entry");
            println!("{from} -> {to}");
        }
        RegistrySubcommand::Remove(entry) => {
            let from: FlakeRef = entry.from.parse()?;

            let mut registry = FlakeRegistry::read(&settings.user_registry)?;
            if registry.remove(&from).is_none() {
                return Err(missing(&from, "no entry in the user registry"));
            }
            registry.write(&settings.user_registry)?;
            println!("Removed {from}");
        }
    }
    Ok(())
}
