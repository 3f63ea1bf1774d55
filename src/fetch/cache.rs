//! On-disk checkout cache
//!
//! Layout: `<root>/git/<key>`, one checkout per (repository URL, commit). The
//! key is the BLAKE3 hash of both, so an immutable reference maps to a stable
//! directory and can be served without touching the network.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;
use crate::error::fs::write_failed;

/// Subdirectory holding git checkouts
pub const GIT_DIR: &str = "git";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCache {
    root: PathBuf,
}

impl FetchCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git_root(&self) -> PathBuf {
        self.root.join(GIT_DIR)
    }

    /// Cache key of a checkout
    pub fn key(url: &str, rev: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(url.as_bytes());
        hasher.update(&[0]);
        hasher.update(rev.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    /// Directory of the checkout of `rev` from `url`
    pub fn checkout_dir(&self, url: &str, rev: &str) -> PathBuf {
        self.git_root().join(Self::key(url, rev))
    }

    /// A fresh scratch directory inside the cache, removed on drop
    ///
    /// Living on the same filesystem as the checkouts lets a finished clone be
    /// moved into place with a rename.
    pub fn staging_dir(&self) -> Result<TempDir> {
        let git_root = self.git_root();
        fs::create_dir_all(&git_root).map_err(|e| write_failed(&git_root, e))?;
        tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&git_root)
            .map_err(|e| write_failed(&git_root, e))
    }

    /// Move a finished checkout into its final place
    ///
    /// If another process stored the same checkout first, that copy is kept.
    pub fn commit(&self, staging: &Path, url: &str, rev: &str) -> Result<PathBuf> {
        let target = self.checkout_dir(url, rev);
        if target.is_dir() {
            return Ok(target);
        }
        match fs::rename(staging, &target) {
            Ok(()) => Ok(target),
            Err(_) if target.is_dir() => Ok(target),
            Err(e) => Err(write_failed(&target, e)),
        }
    }
}
