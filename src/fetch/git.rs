//! Git-backed fetcher
//!
//! - `github:<owner>/<repo>` clones `https://github.com/<owner>/<repo>.git`
//! - Git URLs are cloned with the `git+` prefix stripped
//! - Clean path references are cloned from the local repository
//! - Dirty path references are used in place
//!
//! Checkouts are cached per (URL, commit); fetching an immutable reference
//! whose checkout is cached needs no network access.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Commit, FetchOptions, Oid, RemoteCallbacks, Repository};
use walkdir::WalkDir;

use crate::error::Result;
use crate::error::fetch::fetch_failed;
use crate::flakeref::{DEFAULT_REF, FlakeRef, Location};
use crate::hash::{Hash, HashAlgorithm};

use super::auth::setup_auth_callbacks;
use super::error::describe_git_error;
use super::{FetchCache, FetchedSource, Fetcher};

/// What a checkout resolved to
struct Checkout {
    rev: Hash,
    rev_count: u64,
    last_modified: i64,
}

/// Fetches GitHub, Git and path references with libgit2
#[derive(Debug, Clone)]
pub struct GitFetcher {
    cache: FetchCache,
}

impl GitFetcher {
    pub fn new(cache: FetchCache) -> Self {
        Self { cache }
    }

    /// URL handed to libgit2 for a direct, non-tarball reference
    pub fn clone_url(flake_ref: &FlakeRef) -> Option<String> {
        match &flake_ref.location {
            Location::GitHub { owner, repo } => Some(format!("https://github.com/{owner}/{repo}.git")),
            Location::Git { uri } if !flake_ref.is_tarball() => {
                Some(uri.strip_prefix("git+").unwrap_or(uri).to_string())
            }
            Location::Path { path } => Some(path.clone()),
            Location::Git { .. } | Location::Alias { .. } => None,
        }
    }

    fn fetch_repository(&self, flake_ref: &FlakeRef, url: &str) -> Result<FetchedSource> {
        if let Some(rev) = &flake_ref.rev {
            let dir = self.cache.checkout_dir(url, &rev.to_base16());
            if dir.is_dir() {
                tracing::debug!(url, rev = %rev, "using cached checkout");
                let checkout = inspect_checkout(url, &dir, rev)?;
                return Ok(source(flake_ref, dir, &checkout));
            }
        }

        tracing::info!(url, "cloning repository");
        let staging = self.cache.staging_dir()?;
        let checkout = clone_and_checkout(url, staging.path(), flake_ref)?;
        let dir = self
            .cache
            .commit(staging.path(), url, &checkout.rev.to_base16())?;

        Ok(source(flake_ref, dir, &checkout))
    }
}

impl Fetcher for GitFetcher {
    fn fetch(&self, flake_ref: &FlakeRef) -> Result<FetchedSource> {
        if flake_ref.is_dirty() {
            if let Location::Path { path } = &flake_ref.location {
                return fetch_working_tree(flake_ref, Path::new(path));
            }
        }
        if flake_ref.is_tarball() {
            return Err(fetch_failed(flake_ref, "tarball sources are not supported"));
        }

        let url = Self::clone_url(flake_ref).ok_or_else(|| {
            fetch_failed(flake_ref, "aliases must be resolved through a registry first")
        })?;
        self.fetch_repository(flake_ref, &url)
    }
}

fn source(flake_ref: &FlakeRef, path: PathBuf, checkout: &Checkout) -> FetchedSource {
    FetchedSource {
        path,
        resolved_ref: flake_ref.clone().with_rev(checkout.rev.clone()),
        rev_count: flake_ref
            .supports_rev_count()
            .then_some(checkout.rev_count),
        last_modified: Some(checkout.last_modified),
    }
}

fn clone_and_checkout(url: &str, target: &Path, flake_ref: &FlakeRef) -> Result<Checkout> {
    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    let repo = RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(url, target)
        .map_err(|e| fetch_failed(url, describe_git_error(&e)))?;

    let commit = match &flake_ref.rev {
        Some(rev) => find_commit(&repo, url, rev)?,
        None => resolve_reference(&repo, url, flake_ref.git_ref.as_deref().unwrap_or(DEFAULT_REF))?,
    };

    repo.set_head_detached(commit.id())
        .and_then(|()| repo.checkout_head(Some(CheckoutBuilder::new().force())))
        .map_err(|e| fetch_failed(url, format!("checkout of {} failed: {}", commit.id(), e.message())))?;

    describe_commit(&repo, url, &commit)
}

fn inspect_checkout(url: &str, dir: &Path, rev: &Hash) -> Result<Checkout> {
    let repo = Repository::open(dir).map_err(|e| fetch_failed(url, describe_git_error(&e)))?;
    let commit = find_commit(&repo, url, rev)?;
    describe_commit(&repo, url, &commit)
}

fn find_commit<'r>(repo: &'r Repository, url: &str, rev: &Hash) -> Result<Commit<'r>> {
    Oid::from_bytes(rev.digest())
        .and_then(|oid| repo.find_commit(oid))
        .map_err(|_| fetch_failed(url, format!("revision {rev} not found")))
}

/// Resolve a branch or tag name to a commit
fn resolve_reference<'r>(repo: &'r Repository, url: &str, name: &str) -> Result<Commit<'r>> {
    let candidates = [
        format!("refs/remotes/origin/{name}"),
        format!("refs/tags/{name}"),
        format!("refs/heads/{name}"),
    ];

    candidates
        .iter()
        .filter_map(|candidate| repo.find_reference(candidate).ok())
        .find_map(|reference| reference.peel_to_commit().ok())
        .ok_or_else(|| fetch_failed(url, format!("cannot find Git ref '{name}'")))
}

fn describe_commit(repo: &Repository, url: &str, commit: &Commit<'_>) -> Result<Checkout> {
    let rev = Hash::from_digest(HashAlgorithm::Sha1, commit.id().as_bytes().to_vec())
        .ok_or_else(|| fetch_failed(url, "only SHA-1 repositories are supported"))?;

    let walk = repo
        .revwalk()
        .and_then(|mut walk| walk.push(commit.id()).map(|()| walk))
        .map_err(|e| fetch_failed(url, describe_git_error(&e)))?;
    let rev_count = walk.filter(std::result::Result::is_ok).count() as u64;

    Ok(Checkout {
        rev,
        rev_count,
        last_modified: commit.time().seconds(),
    })
}

/// Use a working tree as-is, uncommitted changes included
fn fetch_working_tree(flake_ref: &FlakeRef, path: &Path) -> Result<FetchedSource> {
    if !path.join(".git").exists() {
        return Err(fetch_failed(path.display(), "not a Git repository"));
    }
    tracing::debug!(path = %path.display(), "using working tree");

    let last_modified = WalkDir::new(path)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| entry.metadata().ok()?.modified().ok())
        .max()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .and_then(|age| i64::try_from(age.as_secs()).ok());

    Ok(FetchedSource {
        path: path.to_path_buf(),
        resolved_ref: flake_ref.clone(),
        rev_count: None,
        last_modified,
    })
}
