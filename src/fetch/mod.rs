//! Fetching flake sources
//!
//! A [`Fetcher`] turns a direct [`FlakeRef`] into a local tree. The returned
//! [`FetchedSource`] carries the reference that was actually fetched: the
//! input with the commit it resolved to filled in.
//!
//! ## Module Organization
//!
//! - `git.rs`: libgit2-backed fetcher for GitHub, Git and path references
//! - `cache.rs`: on-disk checkout cache
//! - `auth.rs`: credential callbacks
//! - `error.rs`: readable git error messages
//! - `progress.rs`: spinner decorator for interactive use

mod auth;
pub mod cache;
mod error;
pub mod git;
pub mod progress;

use std::path::PathBuf;

use crate::error::Result;
use crate::flakeref::FlakeRef;

pub use cache::FetchCache;
pub use git::GitFetcher;
pub use progress::ProgressFetcher;

/// A fetched source tree and what was observed while fetching it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSource {
    /// Root of the fetched tree
    pub path: PathBuf,

    /// The input reference with the fetched revision pinned
    pub resolved_ref: FlakeRef,

    /// Number of commits reachable from the fetched revision
    pub rev_count: Option<u64>,

    /// Unix time of the fetched revision
    pub last_modified: Option<i64>,
}

/// Fetches the tree a direct reference points to
///
/// Fetching an immutable reference must be deterministic.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, flake_ref: &FlakeRef) -> Result<FetchedSource>;
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, flake_ref: &FlakeRef) -> Result<FetchedSource> {
        (**self).fetch(flake_ref)
    }
}
