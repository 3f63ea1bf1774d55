//! Resolved flakes and dependency trees

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::flakeref::{FlakeAlias, FlakeId, FlakeRef};
use crate::lockfile::LockFile;

/// A fetched flake with its declared requirements, not yet recursed into
#[derive(Debug, Clone, PartialEq)]
pub struct Flake {
    pub id: FlakeId,

    /// The direct reference actually fetched, never an alias
    pub flake_ref: FlakeRef,

    pub description: String,

    /// Root of the fetched tree
    pub path: PathBuf,

    /// Commit depth; only known for full Git fetches
    pub rev_count: Option<u64>,

    /// Unix time of the fetched revision, or of the newest file in a dirty tree
    pub last_modified: Option<i64>,

    pub requires: Vec<FlakeRef>,

    /// Lock file shipped with the flake; empty if it has none
    pub lock_file: LockFile,

    pub non_flake_requires: BTreeMap<FlakeAlias, FlakeRef>,

    /// Evaluated output, opaque to resolution
    pub provides: serde_json::Value,
}

impl Flake {
    /// Directory holding `flake.yaml` and `flake.lock`
    pub fn source_dir(&self) -> PathBuf {
        if self.flake_ref.subdir.is_empty() {
            self.path.clone()
        } else {
            self.path.join(&self.flake_ref.subdir)
        }
    }
}

/// A dependency that is fetched but not evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonFlake {
    pub alias: FlakeAlias,
    pub flake_ref: FlakeRef,
    pub path: PathBuf,
    pub last_modified: Option<i64>,
}

/// The resolved dependency tree of one flake
#[derive(Debug, Clone, PartialEq)]
pub struct Dependencies {
    pub flake: Flake,
    /// In declaration order
    pub flake_deps: Vec<Dependencies>,
    /// In alias order
    pub non_flake_deps: Vec<NonFlake>,
}

impl Dependencies {
    pub fn new(flake: Flake) -> Self {
        Self {
            flake,
            flake_deps: Vec::new(),
            non_flake_deps: Vec::new(),
        }
    }

    /// Number of levels in the tree, counting the root
    pub fn depth(&self) -> usize {
        1 + self
            .flake_deps
            .iter()
            .map(Dependencies::depth)
            .max()
            .unwrap_or(0)
    }

    /// Visit every flake in the tree, parents before children
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Dependencies, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, level: usize, visit: &mut impl FnMut(&'a Dependencies, usize)) {
        visit(self, level);
        for dep in &self.flake_deps {
            dep.walk_at(level + 1, visit);
        }
    }
}
