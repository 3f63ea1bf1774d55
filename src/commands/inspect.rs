//! Inspect command

use crate::cli::InspectArgs;
use crate::error::Result;
use crate::flakeref::FlakeRef;
use crate::ui::display::render_flake_ref;

/// Parse a reference and print its parts
pub fn run(args: InspectArgs) -> Result<()> {
    let flake_ref = FlakeRef::parse(&args.flake_ref, args.relative)?;
    print!("{}", render_flake_ref(&flake_ref));
    Ok(())
}
