//! Resolve command

use crate::cli::ResolveArgs;
use crate::error::Result;
use crate::settings::Overrides;
use crate::ui::display::render_tree;

use super::helpers::{build_resolver, parse_user_ref};

/// Resolve a flake and print its dependency tree
pub fn run(overrides: &Overrides, args: ResolveArgs) -> Result<()> {
    let flake_ref = parse_user_ref(&args.flake_ref)?;
    let resolver = build_resolver(overrides, !args.no_lock)?;
    let deps = resolver.resolve_flake(&flake_ref, args.impure)?;
    print!("{}", render_tree(&deps));
    Ok(())
}
