//! Lock file updates
//!
//! [`LockFileUpdater`] resolves a flake with unpinned dependencies allowed and
//! projects the resolved tree into a [`LockFile`], recording the exact
//! reference each dependency was fetched at. Entries of the flake's existing
//! lock file that still contain the fresh reference are kept, so repeated
//! updates do not churn.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use normpath::PathExt;

use crate::error::Result;
use crate::flake::{Dependencies, Flake};
use crate::flakeref::{FlakeAlias, FlakeId, FlakeRef};
use crate::resolver::Resolver;

use super::{FlakeEntry, LOCK_FILE_NAME, LockFile, LockedInputs};

/// Options for a lock file update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Ignore existing lock state and re-resolve every requirement
    pub recreate: bool,
}

/// Outcome of updating a lock file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockFileUpdate {
    pub lock_file: LockFile,
    pub path: PathBuf,
    /// False when the file already had the computed content
    pub written: bool,
}

/// Computes lock files from resolved dependency trees
pub struct LockFileUpdater<'r> {
    resolver: &'r Resolver,
    options: UpdateOptions,
}

impl<'r> LockFileUpdater<'r> {
    pub fn new(resolver: &'r Resolver) -> Self {
        Self {
            resolver,
            options: UpdateOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: UpdateOptions) -> Self {
        self.options = options;
        self
    }

    /// Compute a new lock file for an already fetched flake
    ///
    /// The flake itself is left untouched.
    ///
    /// # Errors
    ///
    /// Fails if resolution fails or if a dependency resolved to a reference
    /// that is not immutable (`LockfileUnpinned`).
    pub fn update(&self, flake: &Flake) -> Result<LockFile> {
        let keep_locks = !self.options.recreate;
        let deps = self.resolver.resolve_for_update(flake.clone(), keep_locks)?;

        let previous = keep_locks.then_some(&flake.lock_file as &dyn LockedInputs);
        let (flake_entries, non_flake_entries) = lock_inputs(&deps, previous);

        let lock_file = LockFile {
            flake_entries,
            non_flake_entries,
        };
        lock_file.validate()?;
        Ok(lock_file)
    }

    /// Update `flake.lock` of the flake in the local directory `dir`
    ///
    /// The directory may be a subdirectory of a Git work tree; the lock file
    /// is written next to its `flake.yaml`, and only if its content changed.
    pub fn update_at(&self, dir: &Path) -> Result<LockFileUpdate> {
        let flake_ref = working_tree_ref(dir);
        tracing::info!(flake_ref = %flake_ref, "updating lock file");

        let flake = self.resolver.get_flake(&flake_ref, true)?;
        let lock_file = self.update(&flake)?;

        let path = flake.source_dir().join(LOCK_FILE_NAME);
        let written = lock_file.write_if_changed(&path)?;
        Ok(LockFileUpdate {
            lock_file,
            path,
            written,
        })
    }
}

/// Dirty reference to the work tree containing `dir`, with `dir` as subdir
fn working_tree_ref(dir: &Path) -> FlakeRef {
    let dir = canonical(dir);
    let root = git2::Repository::discover(&dir)
        .ok()
        .and_then(|repo| repo.workdir().map(canonical));

    let Some(root) = root else {
        return FlakeRef::path(dir.display().to_string());
    };

    match dir.strip_prefix(&root) {
        Ok(subdir) => {
            let subdir = subdir
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            FlakeRef::path(root.display().to_string()).with_subdir(subdir)
        }
        Err(_) => FlakeRef::path(dir.display().to_string()),
    }
}

/// Absolute path with symlinks resolved, or `path` itself if it cannot be resolved
fn canonical(path: &Path) -> PathBuf {
    path.normalize()
        .map(normpath::BasePathBuf::into_path_buf)
        .unwrap_or_else(|_| path.components().collect())
}

type Entries = (BTreeMap<FlakeId, FlakeEntry>, BTreeMap<FlakeAlias, FlakeRef>);

/// Project the children of `deps` into lock entries
fn lock_inputs(deps: &Dependencies, previous: Option<&dyn LockedInputs>) -> Entries {
    let mut flake_entries = BTreeMap::new();
    for child in &deps.flake_deps {
        let id = &child.flake.id;
        if flake_entries.contains_key(id) {
            tracing::warn!(id = %id, parent = %deps.flake.id, "flake required twice; keeping the first");
            continue;
        }

        let kept = previous.and_then(|previous| previous.flake_entry(id));
        let flake_ref = keep_or_replace(id, kept.map(|entry| &entry.flake_ref), &child.flake.flake_ref);
        let (nested_flakes, nested_non_flakes) =
            lock_inputs(child, kept.map(|entry| entry as &dyn LockedInputs));

        flake_entries.insert(
            id.clone(),
            FlakeEntry {
                flake_ref,
                flake_entries: nested_flakes,
                non_flake_entries: nested_non_flakes,
            },
        );
    }

    let non_flake_entries = deps
        .non_flake_deps
        .iter()
        .map(|non_flake| {
            let kept = previous.and_then(|previous| previous.non_flake_entry(&non_flake.alias));
            let flake_ref = keep_or_replace(&non_flake.alias, kept, &non_flake.flake_ref);
            (non_flake.alias.clone(), flake_ref)
        })
        .collect();

    (flake_entries, non_flake_entries)
}

fn keep_or_replace(name: &str, previous: Option<&FlakeRef>, fresh: &FlakeRef) -> FlakeRef {
    match previous {
        Some(previous) if previous.is_immutable() && previous.contains(fresh) => previous.clone(),
        Some(previous) => {
            tracing::info!(name, from = %previous, to = %fresh, "updated lock entry");
            fresh.clone()
        }
        None => {
            tracing::info!(name, flake_ref = %fresh, "added lock entry");
            fresh.clone()
        }
    }
}
