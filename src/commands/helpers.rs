//! Command helper utilities

use std::path::{Path, PathBuf};
use std::sync::Arc;

use normpath::PathExt;

use crate::error::Result;
use crate::error::fs::io_error;
use crate::evaluator::ManifestEvaluator;
use crate::fetch::{GitFetcher, ProgressFetcher};
use crate::flakeref::{FlakeRef, Location};
use crate::resolver::{ResolveOptions, Resolver};
use crate::settings::{Overrides, Settings};

/// Resolve a directory argument against the current directory
pub fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| io_error(format!("Failed to get current directory: {e}")))?;
    Ok(absolutize(&cwd, &dir.unwrap_or_default()))
}

/// Parse a reference given on the command line
///
/// Relative paths are accepted and made absolute against the current directory.
pub fn parse_user_ref(input: &str) -> Result<FlakeRef> {
    let mut flake_ref = FlakeRef::parse(input, true)?;
    if let Location::Path { path } = &flake_ref.location {
        if Path::new(path).is_relative() {
            let absolute = resolve_dir(Some(PathBuf::from(path)))?;
            flake_ref.location = Location::Path {
                path: absolute.display().to_string(),
            };
        }
    }
    Ok(flake_ref)
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = base.join(path);
    joined
        .normalize()
        .map(normpath::BasePathBuf::into_path_buf)
        .unwrap_or(joined)
}

/// Build a resolver from the layered settings
pub fn build_resolver(overrides: &Overrides, use_lock_files: bool) -> Result<Resolver> {
    let settings = Settings::load(overrides)?;
    tracing::debug!(?settings, "loaded settings");

    let fetcher = ProgressFetcher::new(GitFetcher::new(settings.fetch_cache()));
    Resolver::new(
        settings.registries()?,
        Arc::new(fetcher),
        Arc::new(ManifestEvaluator::new()),
    )
    .with_options(ResolveOptions {
        jobs: settings.jobs,
        use_lock_files,
        ..ResolveOptions::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_absolutize_relative() {
        let temp = create_temp_dir();
        std::fs::create_dir(temp.path().join("flake")).unwrap();

        let resolved = absolutize(temp.path(), Path::new("./flake"));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("flake"));
        assert!(!resolved.to_string_lossy().contains("./"));
    }

    #[test]
    fn test_absolutize_missing_path_is_joined() {
        let base = Path::new("/nonexistent/base");
        assert_eq!(
            absolutize(base, Path::new("flake")),
            PathBuf::from("/nonexistent/base/flake")
        );
    }

    #[test]
    fn test_parse_user_ref_keeps_non_paths() {
        let flake_ref = parse_user_ref("github:edolstra/dwarffs").unwrap();
        assert_eq!(flake_ref, FlakeRef::github("edolstra", "dwarffs"));
    }

    #[test]
    fn test_parse_user_ref_absolutizes_relative_path() {
        let flake_ref = parse_user_ref(".").unwrap();
        match &flake_ref.location {
            Location::Path { path } => assert!(Path::new(path).is_absolute()),
            other => panic!("unexpected location: {other:?}"),
        }
        assert!(flake_ref.is_dirty());
    }
}
