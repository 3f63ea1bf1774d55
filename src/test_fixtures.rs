//! Test fixtures for flakes living in real Git repositories.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{create_temp_dir, init_repo, write_flake, commit_all};
//!
//! #[test]
//! fn my_test() {
//!     let temp = create_temp_dir();
//!     let repo = init_repo(&temp.path().join("dep"));
//!     write_flake(&temp.path().join("dep"), "dep", &[], &[]);
//!     let head = commit_all(&repo, "init");
//! }
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

use crate::evaluator::MANIFEST_FILE;
use crate::hash::{Hash, HashAlgorithm};

/// Create a temp directory in the system temp location.
///
/// A relative `TMPDIR` is ignored so temp dirs never land under the current
/// working directory.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    let base = std::env::temp_dir();
    let base = if base.is_absolute() {
        base
    } else {
        PathBuf::from("/tmp")
    };
    TempDir::new_in(base).expect("Failed to create temp directory")
}

/// Initialize a repository whose first branch is `master`
pub fn init_repo(dir: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("master");
    Repository::init_opts(dir, &opts).expect("Failed to init git repository")
}

/// Write `flake.yaml` declaring `name` and its requirements
pub fn write_flake(dir: &Path, name: &str, requires: &[&str], non_flake_requires: &[(&str, &str)]) {
    let mut manifest = format!("name: {name}\ndescription: The {name} flake\n");
    if !requires.is_empty() {
        manifest.push_str("requires:\n");
        for requirement in requires {
            manifest.push_str(&format!("  - \"{requirement}\"\n"));
        }
    }
    if !non_flake_requires.is_empty() {
        manifest.push_str("nonFlakeRequires:\n");
        for (alias, requirement) in non_flake_requires {
            manifest.push_str(&format!("  {alias}: \"{requirement}\"\n"));
        }
    }
    fs::create_dir_all(dir).expect("Failed to create flake directory");
    fs::write(dir.join(MANIFEST_FILE), manifest).expect("Failed to write flake.yaml");
}

/// Write `name` with `content` into the work tree and commit everything
pub fn commit_file(repo: &Repository, name: &str, content: &str) -> Oid {
    let workdir = repo.workdir().expect("bare repository").to_path_buf();
    fs::write(workdir.join(name), content).expect("Failed to write file");
    commit_all(repo, name)
}

/// Stage every file in the work tree and commit on the current branch
pub fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Test", "test@example.org").unwrap();
    let parents: Vec<Commit<'_>> = repo
        .head()
        .ok()
        .and_then(|head| head.peel_to_commit().ok())
        .into_iter()
        .collect();
    let parents: Vec<&Commit<'_>> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// The revision of a commit as stored in flake references
pub fn rev_of(oid: Oid) -> Hash {
    Hash::parse_base16(&oid.to_string(), HashAlgorithm::Sha1).unwrap()
}
