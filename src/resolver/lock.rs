//! Lock preference
//!
//! While resolving a flake's requirements the resolver consults the lock
//! state in scope: the entry the parent's lock file recorded for this flake,
//! or else the flake's own lock file. A requirement is swapped for a locked
//! reference when the requirement contains it.

use crate::error::{FlakeError, Result};
use crate::flakeref::{FlakeRef, Location};
use crate::lockfile::{FlakeEntry, LockedInputs};

use super::Resolver;

impl Resolver {
    /// Pick the reference to fetch for a flake requirement, along with the
    /// locked entry whose nested pins apply to its own requirements
    pub(super) fn plan_requirement<'l>(
        &self,
        requirement: &FlakeRef,
        locks: Option<&'l dyn LockedInputs>,
    ) -> Result<(FlakeRef, Option<&'l FlakeEntry>)> {
        let Some(locks) = locks else {
            return Ok((requirement.clone(), None));
        };

        let target = match self.dealias(requirement) {
            Ok(target) => target,
            Err(err @ FlakeError::MissingFlake { .. }) => {
                // An unregistered alias still matches the entry locked under its name
                return match locked_by_alias(requirement, locks) {
                    Some(entry) => {
                        tracing::debug!(
                            requirement = %requirement,
                            locked = %entry.flake_ref,
                            "using locked entry for unregistered alias"
                        );
                        Ok((entry.flake_ref.clone(), Some(entry)))
                    }
                    None => Err(err),
                };
            }
            Err(err) => return Err(err),
        };

        match locks.find_flake_entry(&target) {
            Some((id, entry)) => {
                tracing::debug!(
                    id = %id,
                    requirement = %requirement,
                    locked = %entry.flake_ref,
                    "using locked flake"
                );
                Ok((entry.flake_ref.clone(), Some(entry)))
            }
            None => {
                tracing::debug!(requirement = %requirement, "no matching lock entry");
                Ok((target, None))
            }
        }
    }

    /// Pick the reference to fetch for a non-flake requirement
    pub(super) fn plan_non_flake(
        &self,
        alias: &str,
        requirement: &FlakeRef,
        locks: Option<&dyn LockedInputs>,
    ) -> Result<FlakeRef> {
        let Some(locked) = locks.and_then(|locks| locks.non_flake_entry(alias)) else {
            return Ok(requirement.clone());
        };

        let target = self.dealias(requirement)?;
        if target.contains(locked) {
            tracing::debug!(alias, locked = %locked, "using locked non-flake");
            Ok(locked.clone())
        } else {
            tracing::debug!(alias, requirement = %requirement, "locked non-flake no longer matches");
            Ok(target)
        }
    }
}

fn locked_by_alias<'l>(
    requirement: &FlakeRef,
    locks: &'l dyn LockedInputs,
) -> Option<&'l FlakeEntry> {
    match &requirement.location {
        Location::Alias { alias } if requirement.git_ref.is_none() && requirement.rev.is_none() => {
            locks.flake_entry(alias)
        }
        _ => None,
    }
}
