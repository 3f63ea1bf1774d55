//! Lock file (flake.lock)
//!
//! The lock file records the exact reference every dependency of a flake was
//! resolved to, recursively. Each [`FlakeEntry`] carries its own nested flake
//! and non-flake entries, mirroring the shape of a resolved
//! [`Dependencies`](crate::flake::Dependencies) tree without evaluated content.
//!
//! ## Module Organization
//!
//! - `serialization.rs`: JSON store format
//! - `update.rs`: computing a new lock file from a resolved tree

pub mod serialization;
pub mod update;


use std::collections::BTreeMap;
use std::path::Path;

use crate::common::fs::{read_optional, write_atomic, write_if_changed};
use crate::error::Result;
use crate::error::fs::read_failed;
use crate::error::lockfile::unpinned;
use crate::flakeref::{FlakeAlias, FlakeId, FlakeRef};
use crate::registry::FlakeRegistry;

pub use update::{LockFileUpdate, LockFileUpdater, UpdateOptions};

/// Lock file name, stored next to `flake.yaml`
pub const LOCK_FILE_NAME: &str = "flake.lock";

/// Read access shared by a lock file and each of its entries
pub trait LockedInputs {
    fn flake_entries(&self) -> &BTreeMap<FlakeId, FlakeEntry>;

    fn non_flake_entries(&self) -> &BTreeMap<FlakeAlias, FlakeRef>;

    fn flake_entry(&self, id: &str) -> Option<&FlakeEntry> {
        self.flake_entries().get(id)
    }

    fn non_flake_entry(&self, alias: &str) -> Option<&FlakeRef> {
        self.non_flake_entries().get(alias)
    }

    /// First flake entry (in id order) that `requirement` contains
    fn find_flake_entry(&self, requirement: &FlakeRef) -> Option<(&FlakeId, &FlakeEntry)> {
        self.flake_entries()
            .iter()
            .find(|(_, entry)| requirement.contains(&entry.flake_ref))
    }

    fn has_entries(&self) -> bool {
        !self.flake_entries().is_empty() || !self.non_flake_entries().is_empty()
    }
}

/// A locked flake and its locked dependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlakeEntry {
    pub flake_ref: FlakeRef,
    pub flake_entries: BTreeMap<FlakeId, FlakeEntry>,
    pub non_flake_entries: BTreeMap<FlakeAlias, FlakeRef>,
}

impl FlakeEntry {
    pub fn new(flake_ref: FlakeRef) -> Self {
        Self {
            flake_ref,
            flake_entries: BTreeMap::new(),
            non_flake_entries: BTreeMap::new(),
        }
    }
}

impl LockedInputs for FlakeEntry {
    fn flake_entries(&self) -> &BTreeMap<FlakeId, FlakeEntry> {
        &self.flake_entries
    }

    fn non_flake_entries(&self) -> &BTreeMap<FlakeAlias, FlakeRef> {
        &self.non_flake_entries
    }
}

/// Lock file structure (flake.lock)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockFile {
    pub flake_entries: BTreeMap<FlakeId, FlakeEntry>,
    pub non_flake_entries: BTreeMap<FlakeAlias, FlakeRef>,
}

impl LockedInputs for LockFile {
    fn flake_entries(&self) -> &BTreeMap<FlakeId, FlakeEntry> {
        &self.flake_entries
    }

    fn non_flake_entries(&self) -> &BTreeMap<FlakeAlias, FlakeRef> {
        &self.non_flake_entries
    }
}

impl LockFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_entries()
    }

    /// Parse a lock file from JSON; `path` is used for error messages only
    pub fn from_json(json: &str, path: &Path) -> Result<Self> {
        serialization::deserialize_lock_file(json, path)
    }

    /// Serialize to pretty-printed JSON with sorted keys and a trailing newline
    pub fn to_json(&self) -> Result<String> {
        serialization::serialize_lock_file(self)
    }

    /// Read a lock file; the file must exist
    pub fn read(path: &Path) -> Result<Self> {
        let content = read_optional(path)?
            .ok_or_else(|| read_failed(path, "no such file"))?;
        Self::from_json(&content, path)
    }

    /// Read `flake.lock` from a flake directory; a missing file is an empty lock
    pub fn read_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        match read_optional(&path)? {
            Some(content) => Self::from_json(&content, &path),
            None => Ok(Self::new()),
        }
    }

    /// Write the lock file atomically
    pub fn write(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_json()?)
    }

    /// Write the lock file unless the file already has identical content
    pub fn write_if_changed(&self, path: &Path) -> Result<bool> {
        let written = write_if_changed(path, &self.to_json()?)?;
        if written {
            tracing::info!(path = %path.display(), "wrote lock file");
        } else {
            tracing::debug!(path = %path.display(), "lock file unchanged");
        }
        Ok(written)
    }

    /// Check that every entry, at any depth, is pinned to an immutable reference
    pub fn validate(&self) -> Result<()> {
        validate_inputs(self)
    }

    /// The top-level pins as a registry mapping each id to its locked reference
    pub fn to_registry(&self) -> FlakeRegistry {
        let flakes = self
            .flake_entries
            .iter()
            .map(|(id, entry)| (FlakeRef::alias(id.as_str()), entry.flake_ref.clone()));
        let non_flakes = self
            .non_flake_entries
            .iter()
            .map(|(alias, flake_ref)| (FlakeRef::alias(alias.as_str()), flake_ref.clone()));
        flakes.chain(non_flakes).collect()
    }
}

fn validate_inputs(inputs: &dyn LockedInputs) -> Result<()> {
    for (id, entry) in inputs.flake_entries() {
        if !entry.flake_ref.is_immutable() {
            return Err(unpinned(id.as_str(), &entry.flake_ref));
        }
        validate_inputs(entry)?;
    }
    for (alias, flake_ref) in inputs.non_flake_entries() {
        if !flake_ref.is_immutable() {
            return Err(unpinned(alias.as_str(), flake_ref));
        }
    }
    Ok(())
}
