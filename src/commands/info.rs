//! Info command

use crate::cli::InfoArgs;
use crate::error::Result;
use crate::settings::Overrides;
use crate::ui::display::render_flake;

use super::helpers::{build_resolver, parse_user_ref};

/// Fetch a flake and print its metadata
pub fn run(overrides: &Overrides, args: InfoArgs) -> Result<()> {
    let flake_ref = parse_user_ref(&args.flake_ref)?;
    let resolver = build_resolver(overrides, true)?;
    let flake = resolver.get_flake(&flake_ref, args.impure)?;
    print!("{}", render_flake(&flake));
    Ok(())
}
