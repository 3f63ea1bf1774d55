//! Flake registry
//!
//! A registry maps references (usually aliases) to the references they stand
//! for. Lookup is a single hop; chasing chains of aliases is bounded by the
//! resolver.
//!
//! Several registries may be in effect at once (command line, user, global).
//! [`Registries`] consults them in precedence order.

pub mod serialization;


use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::common::fs::{read_optional, write_atomic};
use crate::error::Result;
use crate::flakeref::FlakeRef;

/// A single-hop mapping from one reference to another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlakeRegistry {
    entries: BTreeMap<FlakeRef, FlakeRef>,
}

impl FlakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a reference, trying the exact key before its base reference
    ///
    /// `nixpkgs/19.09` therefore finds an entry registered for `nixpkgs`; the
    /// caller applies the pins carried by the original reference.
    pub fn lookup(&self, flake_ref: &FlakeRef) -> Option<&FlakeRef> {
        self.entries
            .get(flake_ref)
            .or_else(|| self.entries.get(&flake_ref.base_ref()))
    }

    /// Follow one registry hop, applying the pins carried by `flake_ref`
    ///
    /// An exact key match already accounts for the pins and is returned as-is.
    /// A match through the base reference gets the pins of `flake_ref` (if it
    /// has any) in place of the target's own.
    pub fn dereference(&self, flake_ref: &FlakeRef) -> Option<FlakeRef> {
        if let Some(target) = self.entries.get(flake_ref) {
            return Some(target.clone());
        }
        self.entries
            .get(&flake_ref.base_ref())
            .map(|target| target.clone().apply_alias_override(flake_ref))
    }

    /// Add or replace an entry, returning the previous target
    pub fn add(&mut self, from: FlakeRef, to: FlakeRef) -> Option<FlakeRef> {
        self.entries.insert(from, to)
    }

    pub fn remove(&mut self, from: &FlakeRef) -> Option<FlakeRef> {
        self.entries.remove(from)
    }

    /// Entries in key order
    pub fn entries(&self) -> impl Iterator<Item = (&FlakeRef, &FlakeRef)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a registry from its JSON form
    pub fn from_json(json: &str, path: &Path) -> Result<Self> {
        Ok(Self {
            entries: serialization::deserialize_registry(json, path)?,
        })
    }

    /// Serialize to pretty-printed JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        serialization::serialize_registry(&self.entries)
    }

    /// Read a registry file; a missing file is an empty registry
    pub fn read(path: &Path) -> Result<Self> {
        match read_optional(path)? {
            Some(content) => Self::from_json(&content, path),
            None => {
                tracing::debug!(path = %path.display(), "registry file not found, using empty registry");
                Ok(Self::new())
            }
        }
    }

    /// Write a registry file atomically
    pub fn write(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_json()?)
    }
}

impl FromIterator<(FlakeRef, FlakeRef)> for FlakeRegistry {
    fn from_iter<I: IntoIterator<Item = (FlakeRef, FlakeRef)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Where a registry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RegistryKind {
    /// Given with `--registry`
    Flag,
    /// The per-user registry
    User,
    /// The system-wide registry
    Global,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RegistryKind::Flag => "flag",
            RegistryKind::User => "user",
            RegistryKind::Global => "global",
        })
    }
}

/// An ordered stack of registries; the first hit wins
#[derive(Debug, Clone, Default)]
pub struct Registries {
    layers: Vec<(RegistryKind, FlakeRegistry)>,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registry with lower precedence than those already present
    pub fn push(&mut self, kind: RegistryKind, registry: FlakeRegistry) {
        self.layers.push((kind, registry));
    }

    #[must_use]
    pub fn with(mut self, kind: RegistryKind, registry: FlakeRegistry) -> Self {
        self.push(kind, registry);
        self
    }

    pub fn lookup(&self, flake_ref: &FlakeRef) -> Option<&FlakeRef> {
        self.layers
            .iter()
            .find_map(|(_, registry)| registry.lookup(flake_ref))
    }

    pub fn dereference(&self, flake_ref: &FlakeRef) -> Option<FlakeRef> {
        self.layers
            .iter()
            .find_map(|(_, registry)| registry.dereference(flake_ref))
    }

    pub fn layers(&self) -> impl Iterator<Item = (RegistryKind, &FlakeRegistry)> {
        self.layers.iter().map(|(kind, registry)| (*kind, registry))
    }
}

impl From<FlakeRegistry> for Registries {
    fn from(registry: FlakeRegistry) -> Self {
        Self::new().with(RegistryKind::Flag, registry)
    }
}
