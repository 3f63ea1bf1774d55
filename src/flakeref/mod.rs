//! Flake references
//!
//! A [`FlakeRef`] identifies where a flake lives, optionally pinned to a
//! branch/tag (`ref`) and a commit or content hash (`rev`). Four kinds of
//! location exist:
//!
//! - `nixpkgs`, `nixpkgs/19.09`, `nixpkgs/19.09/<rev>`: an alias looked up in
//!   the flake registry, optionally overriding the target's ref/rev
//! - `github:edolstra/dwarffs(/<ref-or-rev>)`: a GitHub repository
//! - `git+https://example.org/repo.git?ref=..&rev=..`: any Git URL, and
//!   `https://example.org/source.tar.xz?hash=<sri>`: a tarball
//! - `/path/to/repo(?ref=..&rev=..)`: a local Git checkout; without a ref or
//!   rev the (possibly dirty) working tree is used
//!
//! ## Module Organization
//!
//! - `parser.rs`: the textual grammar
//! - `tests.rs`: parser, printer and specificity tests

mod parser;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FlakeError, Result};
use crate::hash::{Hash, HashAlgorithm};

pub use parser::{is_flake_id, is_ref_name};

/// Identifier a flake declares for itself
pub type FlakeId = String;

/// Name under which a non-flake requirement is exposed
pub type FlakeAlias = String;

/// Branch used when a Git or GitHub reference names neither ref nor rev
pub const DEFAULT_REF: &str = "master";

/// Archive suffixes that make an http(s)/file URL a tarball
pub const TARBALL_EXTENSIONS: &[&str] = &[".tar", ".tar.gz", ".tgz", ".tar.xz", ".tar.bz2", ".zip"];

/// Where a flake lives
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    /// Indirect reference resolved through the registry
    Alias { alias: FlakeAlias },
    /// GitHub repository, fetched as a single revision
    GitHub { owner: String, repo: String },
    /// Git URL or tarball URL
    Git { uri: String },
    /// Local filesystem path
    Path { path: String },
}

/// A reference to a flake
///
/// Equality and ordering cover the location, `ref`, `rev` and `subdir`, in
/// that order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlakeRef {
    pub location: Location,

    /// Branch or tag name
    pub git_ref: Option<String>,

    /// Commit hash (Git, GitHub, Path) or content hash (tarballs)
    pub rev: Option<Hash>,

    /// Directory of the flake relative to the root of the fetched tree
    pub subdir: String,
}

impl FlakeRef {
    fn with_location(location: Location) -> Self {
        Self {
            location,
            git_ref: None,
            rev: None,
            subdir: String::new(),
        }
    }

    /// An alias to be looked up in the registry
    pub fn alias(alias: impl Into<String>) -> Self {
        Self::with_location(Location::Alias {
            alias: alias.into(),
        })
    }

    /// A GitHub repository on the default branch
    pub fn github(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        let mut flake_ref = Self::with_location(Location::GitHub {
            owner: owner.into(),
            repo: repo.into(),
        });
        flake_ref.git_ref = Some(DEFAULT_REF.to_string());
        flake_ref
    }

    /// A Git repository on the default branch
    pub fn git(uri: impl Into<String>) -> Self {
        let mut flake_ref = Self::with_location(Location::Git { uri: uri.into() });
        flake_ref.git_ref = Some(DEFAULT_REF.to_string());
        flake_ref
    }

    /// A tarball URL, unpinned
    pub fn tarball(uri: impl Into<String>) -> Self {
        Self::with_location(Location::Git { uri: uri.into() })
    }

    /// The working tree at `path`, as-is
    pub fn path(path: impl Into<String>) -> Self {
        let mut flake_ref = Self::with_location(Location::Path { path: path.into() });
        flake_ref.rev = Some(Hash::empty(HashAlgorithm::Sha1));
        flake_ref
    }

    /// Set the branch or tag; a dirty working tree sentinel is dropped
    #[must_use]
    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        if self.is_dirty() {
            self.rev = None;
        }
        self.git_ref = Some(git_ref.into());
        self
    }

    /// Set the revision; the dirty sentinel on a path drops any branch or tag
    #[must_use]
    pub fn with_rev(mut self, rev: Hash) -> Self {
        self.rev = Some(rev);
        if self.is_dirty() {
            self.git_ref = None;
        }
        self
    }

    #[must_use]
    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = subdir.into();
        self
    }

    /// Parse a reference from text
    ///
    /// Relative paths (`./foo`, `../foo`, `.`) are accepted only when
    /// `allow_relative` is set; they are kept verbatim.
    pub fn parse(input: &str, allow_relative: bool) -> Result<Self> {
        parser::parse(input, allow_relative)
    }

    /// True unless this reference must be looked up in a registry
    pub fn is_direct(&self) -> bool {
        !matches!(self.location, Location::Alias { .. })
    }

    /// True if this reference pins an exact commit or content hash
    pub fn is_immutable(&self) -> bool {
        match (&self.location, &self.rev) {
            (Location::Alias { .. }, _) | (_, None) => false,
            (Location::Path { .. }, Some(rev)) => !rev.is_empty(),
            (_, Some(_)) => true,
        }
    }

    /// True for a local path that denotes its working tree as-is
    pub fn is_dirty(&self) -> bool {
        matches!(self.location, Location::Path { .. })
            && self.rev.as_ref().is_some_and(Hash::is_empty)
    }

    /// True for http(s)/file URLs ending in an archive extension
    pub fn is_tarball(&self) -> bool {
        match &self.location {
            Location::Git { uri } => is_tarball_uri(uri),
            _ => false,
        }
    }

    /// Whether fetching this location can report a commit count
    pub fn supports_rev_count(&self) -> bool {
        match self.location {
            Location::Git { .. } => !self.is_tarball(),
            Location::Path { .. } => true,
            Location::Alias { .. } | Location::GitHub { .. } => false,
        }
    }

    /// The same location without `ref` or `rev`
    #[must_use]
    pub fn base_ref(&self) -> Self {
        Self {
            location: self.location.clone(),
            git_ref: None,
            rev: None,
            subdir: self.subdir.clone(),
        }
    }

    /// Return true if `other` is at least as specific as `self`
    ///
    /// For example `github:NixOS/nixpkgs` (branch `master`) contains
    /// `github:NixOS/nixpkgs/master?rev=<hash>`, but a reference pinned to a
    /// rev contains nothing but itself.
    pub fn contains(&self, other: &FlakeRef) -> bool {
        if self.location != other.location || self.subdir != other.subdir {
            return false;
        }
        if self.rev.is_some() {
            return self == other;
        }
        match &self.git_ref {
            Some(git_ref) => other.git_ref.as_ref() == Some(git_ref),
            None => true,
        }
    }

    /// Replace `ref` and `rev` with the pins carried by an alias
    ///
    /// An alias without pins leaves the target unchanged; an alias with a
    /// `ref` or a `rev` replaces both fields.
    #[must_use]
    pub fn apply_alias_override(mut self, alias: &FlakeRef) -> Self {
        if alias.git_ref.is_some() || alias.rev.is_some() {
            self.git_ref.clone_from(&alias.git_ref);
            self.rev.clone_from(&alias.rev);
        }
        self
    }

    /// Short name of the location kind
    pub fn kind(&self) -> &'static str {
        match self.location {
            Location::Alias { .. } => "alias",
            Location::GitHub { .. } => "github",
            Location::Git { .. } if self.is_tarball() => "tarball",
            Location::Git { .. } => "git",
            Location::Path { .. } => "path",
        }
    }
}

/// Whether a URL names a tarball
pub fn is_tarball_uri(uri: &str) -> bool {
    let is_archive_scheme = ["http://", "https://", "file://"]
        .iter()
        .any(|scheme| uri.starts_with(scheme));
    is_archive_scheme && TARBALL_EXTENSIONS.iter().any(|ext| uri.ends_with(ext))
}

impl fmt::Display for FlakeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params: Vec<(&str, String)> = Vec::new();
        let subdir = (!self.subdir.is_empty()).then(|| ("dir", self.subdir.clone()));

        match &self.location {
            Location::Alias { alias } => {
                f.write_str(alias)?;
                if let Some(git_ref) = &self.git_ref {
                    write!(f, "/{git_ref}")?;
                }
                if let Some(rev) = &self.rev {
                    write!(f, "/{}", rev.to_base16())?;
                }
                return Ok(());
            }
            Location::GitHub { owner, repo } => {
                write!(f, "github:{owner}/{repo}")?;
                match (&self.git_ref, &self.rev) {
                    (Some(git_ref), Some(rev)) => {
                        write!(f, "/{git_ref}")?;
                        params.push(("rev", rev.to_base16()));
                    }
                    (None, Some(rev)) => write!(f, "/{}", rev.to_base16())?,
                    (Some(git_ref), None) => write!(f, "/{git_ref}")?,
                    (None, None) => {}
                }
            }
            Location::Git { uri } if is_tarball_uri(uri) => {
                f.write_str(uri)?;
                if let Some(rev) = &self.rev {
                    params.push(("hash", rev.to_sri()));
                }
            }
            Location::Git { uri } => {
                f.write_str(uri)?;
                push_ref_and_rev(&mut params, self);
            }
            Location::Path { path } => {
                f.write_str(path)?;
                if !self.is_dirty() {
                    push_ref_and_rev(&mut params, self);
                }
            }
        }

        params.extend(subdir);
        for (i, (key, value)) in params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

fn push_ref_and_rev(params: &mut Vec<(&str, String)>, flake_ref: &FlakeRef) {
    if let Some(git_ref) = &flake_ref.git_ref {
        params.push(("ref", git_ref.clone()));
    }
    if let Some(rev) = &flake_ref.rev {
        params.push(("rev", rev.to_base16()));
    }
}

impl FromStr for FlakeRef {
    type Err = FlakeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parser::parse(s, false)
    }
}

impl Serialize for FlakeRef {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FlakeRef {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
