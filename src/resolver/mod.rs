//! Dependency resolution for flakes
//!
//! This module handles:
//! - Dereferencing aliases through the registries (bounded hop count)
//! - The purity gate: only pinned references may be fetched in pure mode
//! - Fetching and evaluating a single flake ([`Resolver::get_flake`])
//! - Resolving the full dependency tree ([`Resolver::resolve_flake`]),
//!   preferring pins from lock files and detecting cycles on the active path
//!
//! ## Module Organization
//!
//! - `lock.rs`: matching requirements against locked entries
//! - `validation.rs`: cycle detection and the purity gate
//! - `tests.rs`: resolution tests against in-memory collaborators

mod lock;
pub mod validation;


use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;

use crate::error::config::invalid;
use crate::error::flakeref::missing;
use crate::error::resolve::{alias_loop, evaluation_failed};
use crate::error::{FlakeError, Result};
use crate::evaluator::Evaluator;
use crate::fetch::Fetcher;
use crate::flake::{Dependencies, Flake, NonFlake};
use crate::flakeref::{FlakeId, FlakeRef};
use crate::lockfile::{FlakeEntry, LockFile, LockedInputs};
use crate::registry::Registries;

use validation::{check_cycle, check_purity};

/// Maximum number of registry lookups while dereferencing one alias
pub const MAX_ALIAS_HOPS: usize = 32;

/// Options for a resolution pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Number of sibling requirements resolved concurrently
    pub jobs: usize,

    /// Allow dependencies to be unpinned; set while producing a lock file
    pub allow_unpinned_deps: bool,

    /// Prefer pins from lock files over the declared requirements
    pub use_lock_files: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            allow_unpinned_deps: false,
            use_lock_files: true,
        }
    }
}

/// Resolves flake references into fetched flakes and dependency trees
pub struct Resolver {
    registries: Registries,
    fetcher: Arc<dyn Fetcher>,
    evaluator: Arc<dyn Evaluator>,
    options: ResolveOptions,
    pool: Option<rayon::ThreadPool>,
    /// Fetched flakes keyed by immutable direct reference
    flakes: Mutex<HashMap<FlakeRef, Flake>>,
}

impl Resolver {
    pub fn new(
        registries: Registries,
        fetcher: Arc<dyn Fetcher>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            registries,
            fetcher,
            evaluator,
            options: ResolveOptions::default(),
            pool: None,
            flakes: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the resolution options
    ///
    /// # Errors
    ///
    /// Returns `FlakeError::ConfigInvalid` if `jobs` is zero or the worker
    /// pool cannot be started.
    pub fn with_options(mut self, options: ResolveOptions) -> Result<Self> {
        if options.jobs == 0 {
            return Err(invalid("jobs must be at least 1"));
        }

        self.pool = if options.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.jobs)
                .thread_name(|i| format!("flakepin-resolve-{i}"))
                .build()
                .map_err(|e| invalid(format!("failed to start {} resolver threads: {e}", options.jobs)))?;
            Some(pool)
        } else {
            None
        };
        self.options = options;
        Ok(self)
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Follow registry entries until `flake_ref` is direct
    ///
    /// Pins carried by an alias replace those of its target. Fails with
    /// `MissingFlake` when an alias has no entry and with `AliasLoop` after
    /// [`MAX_ALIAS_HOPS`] lookups.
    pub fn dealias(&self, flake_ref: &FlakeRef) -> Result<FlakeRef> {
        let mut current = flake_ref.clone();
        let mut visited = vec![current.to_string()];

        for _ in 0..MAX_ALIAS_HOPS {
            if current.is_direct() {
                return Ok(current);
            }
            let target = self
                .registries
                .dereference(&current)
                .ok_or_else(|| missing(&current, "no entry in any flake registry"))?;
            tracing::debug!(from = %current, to = %target, "dealiased flake reference");
            visited.push(target.to_string());
            current = target;
        }

        if current.is_direct() {
            Ok(current)
        } else {
            Err(alias_loop(&visited))
        }
    }

    /// Fetch and evaluate the flake `flake_ref` points to
    ///
    /// Unless `impure_is_allowed`, the dereferenced reference must be
    /// immutable. The returned flake records the reference actually
    /// fetched, never the alias.
    pub fn get_flake(&self, flake_ref: &FlakeRef, impure_is_allowed: bool) -> Result<Flake> {
        let direct = self.dealias(flake_ref)?;
        check_purity(&direct, impure_is_allowed)?;

        let memoize = direct.is_immutable();
        if memoize {
            if let Some(flake) = self.cached_flake(&direct) {
                tracing::debug!(flake_ref = %direct, "reusing fetched flake");
                return Ok(flake);
            }
        }

        tracing::debug!(flake_ref = %direct, "fetching flake");
        let source = self
            .fetcher
            .fetch(&direct)
            .map_err(|e| missing(&direct, e.to_string()))?;

        let rev_count = if source.resolved_ref.supports_rev_count() {
            source.rev_count
        } else {
            None
        };

        let evaluation = self
            .evaluator
            .evaluate(&source.path, &source.resolved_ref.subdir)
            .map_err(|e| match e {
                FlakeError::EvaluationFailed { reason, .. } => evaluation_failed(&direct, reason),
                other => evaluation_failed(&direct, other.to_string()),
            })?;

        let source_dir = if source.resolved_ref.subdir.is_empty() {
            source.path.clone()
        } else {
            source.path.join(&source.resolved_ref.subdir)
        };
        let lock_file = LockFile::read_from_dir(&source_dir)?;

        let flake = Flake {
            id: evaluation.id,
            flake_ref: source.resolved_ref,
            description: evaluation.description,
            path: source.path,
            rev_count,
            last_modified: source.last_modified,
            requires: evaluation.requires,
            lock_file,
            non_flake_requires: evaluation.non_flake_requires,
            provides: evaluation.provides,
        };
        tracing::info!(id = %flake.id, flake_ref = %flake.flake_ref, "fetched flake");

        if memoize {
            self.flakes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(direct, flake.clone());
        }
        Ok(flake)
    }

    /// Fetch a dependency that is not itself a flake
    pub fn get_non_flake(&self, flake_ref: &FlakeRef, alias: &str) -> Result<NonFlake> {
        self.fetch_non_flake(flake_ref, alias, self.options.allow_unpinned_deps)
    }

    /// Resolve `flake_ref` and, recursively, everything it requires
    ///
    /// `impure_top_ref` relaxes the purity gate for the top flake only.
    pub fn resolve_flake(&self, flake_ref: &FlakeRef, impure_top_ref: bool) -> Result<Dependencies> {
        let flake = self.get_flake(flake_ref, impure_top_ref)?;
        self.resolve_fetched(flake)
    }

    /// Resolve the requirements of an already fetched flake
    pub fn resolve_fetched(&self, flake: Flake) -> Result<Dependencies> {
        self.resolve_node(flake, &[], None, self.options)
    }

    /// Resolve for a lock file update: dependencies may be unpinned, and
    /// existing lock state is consulted only when `keep_locks` is set
    pub(crate) fn resolve_for_update(&self, flake: Flake, keep_locks: bool) -> Result<Dependencies> {
        let options = ResolveOptions {
            allow_unpinned_deps: true,
            use_lock_files: self.options.use_lock_files && keep_locks,
            ..self.options
        };
        self.resolve_node(flake, &[], None, options)
    }

    fn cached_flake(&self, flake_ref: &FlakeRef) -> Option<Flake> {
        self.flakes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(flake_ref)
            .cloned()
    }

    fn fetch_non_flake(
        &self,
        flake_ref: &FlakeRef,
        alias: &str,
        impure_is_allowed: bool,
    ) -> Result<NonFlake> {
        let direct = self.dealias(flake_ref)?;
        check_purity(&direct, impure_is_allowed)?;

        tracing::debug!(alias, flake_ref = %direct, "fetching non-flake");
        let source = self
            .fetcher
            .fetch(&direct)
            .map_err(|e| missing(&direct, e.to_string()))?;

        Ok(NonFlake {
            alias: alias.to_string(),
            flake_ref: source.resolved_ref,
            path: source.path,
            last_modified: source.last_modified,
        })
    }

    fn resolve_node(
        &self,
        flake: Flake,
        ancestors: &[FlakeId],
        inherited: Option<&FlakeEntry>,
        options: ResolveOptions,
    ) -> Result<Dependencies> {
        check_cycle(&flake.id, ancestors)?;

        let mut path = ancestors.to_vec();
        path.push(flake.id.clone());

        // A parent's entry for this flake takes precedence over its own lock file
        let locks: Option<&dyn LockedInputs> = match inherited {
            _ if !options.use_lock_files => None,
            Some(entry) => Some(entry as &dyn LockedInputs),
            None if flake.lock_file.has_entries() => Some(&flake.lock_file as &dyn LockedInputs),
            None => None,
        };

        let planned = flake
            .requires
            .iter()
            .map(|requirement| self.plan_requirement(requirement, locks))
            .collect::<Result<Vec<_>>>()?;

        let resolve_child = |(flake_ref, entry): &(FlakeRef, Option<&FlakeEntry>)| {
            let child = self.get_flake(flake_ref, options.allow_unpinned_deps)?;
            self.resolve_node(child, &path, *entry, options)
        };

        let flake_deps = match &self.pool {
            Some(pool) if planned.len() > 1 => {
                pool.install(|| planned.par_iter().map(resolve_child).collect::<Result<Vec<_>>>())?
            }
            _ => planned.iter().map(resolve_child).collect::<Result<Vec<_>>>()?,
        };

        let mut non_flake_deps = Vec::with_capacity(flake.non_flake_requires.len());
        for (alias, requirement) in &flake.non_flake_requires {
            let flake_ref = self.plan_non_flake(alias, requirement, locks)?;
            non_flake_deps.push(self.fetch_non_flake(
                &flake_ref,
                alias,
                options.allow_unpinned_deps,
            )?);
        }

        tracing::debug!(
            id = %flake.id,
            flake_deps = flake_deps.len(),
            non_flake_deps = non_flake_deps.len(),
            "resolved dependencies"
        );

        Ok(Dependencies {
            flake,
            flake_deps,
            non_flake_deps,
        })
    }
}
