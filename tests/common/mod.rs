//! Common test utilities for flakepin integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::{Commit, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

/// An isolated environment: its own cache, registry and config
pub struct TestWorld {
    pub temp: TempDir,
    pub path: PathBuf,
}

impl TestWorld {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.path.join("registry.json")
    }

    /// The flakepin binary with every setting pointed into this world
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("flakepin").expect("flakepin binary");
        cmd.env("FLAKEPIN_CONFIG", self.path.join("config.yaml"))
            .env("FLAKEPIN_CACHE_DIR", self.path.join("cache"))
            .env("FLAKEPIN_REGISTRY", self.registry_path())
            .env_remove("FLAKEPIN_GLOBAL_REGISTRY")
            .env_remove("FLAKEPIN_JOBS")
            .env_remove("RUST_LOG")
            .current_dir(&self.path);
        cmd
    }

    /// Create a committed flake repository named `name` and return its path
    pub fn flake(&self, name: &str, requires: &[&str]) -> PathBuf {
        let dir = self.path.join(name);
        let repo = init_repo(&dir);
        write_flake(&dir, name, requires);
        commit_all(&repo, "init");
        dir
    }

    pub fn read_file(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("Failed to read file")
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// `git+file://` reference to a local repository
pub fn git_url(dir: &Path) -> String {
    format!("git+file://{}", dir.display())
}

pub fn init_repo(dir: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("master");
    Repository::init_opts(dir, &opts).expect("Failed to init git repository")
}

pub fn write_flake(dir: &Path, name: &str, requires: &[&str]) {
    let mut manifest = format!("name: {name}\ndescription: The {name} flake\n");
    if !requires.is_empty() {
        manifest.push_str("requires:\n");
        for requirement in requires {
            manifest.push_str(&format!("  - \"{requirement}\"\n"));
        }
    }
    fs::create_dir_all(dir).expect("Failed to create flake directory");
    fs::write(dir.join("flake.yaml"), manifest).expect("Failed to write flake.yaml");
}

pub fn commit_all(repo: &Repository, message: &str) {
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
        .unwrap();
}
