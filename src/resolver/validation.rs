//! Validation utilities for resolver
//!
//! This module provides:
//! - Circular dependency detection
//! - The purity gate applied before fetching

use crate::error::Result;
use crate::error::flakeref::impure;
use crate::error::resolve::circular;
use crate::flakeref::{FlakeId, FlakeRef};

/// Check for circular dependency in resolution stack
///
/// # Errors
///
/// Returns `FlakeError::CircularDependency` if `id` is already being resolved.
pub fn check_cycle(id: &str, resolution_stack: &[FlakeId]) -> Result<()> {
    if resolution_stack.iter().any(|ancestor| ancestor == id) {
        return Err(circular(resolution_stack, id));
    }
    Ok(())
}

/// Reject a mutable reference unless impure fetching is allowed
///
/// # Errors
///
/// Returns `FlakeError::ImpureFlakeRef` for a reference that is not pinned
/// to an exact revision (including a dirty working tree).
pub fn check_purity(flake_ref: &FlakeRef, impure_is_allowed: bool) -> Result<()> {
    if !impure_is_allowed && !flake_ref.is_immutable() {
        return Err(impure(flake_ref));
    }
    Ok(())
}
