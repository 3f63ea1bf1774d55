//! Flake reference grammar
//!
//! Supported formats:
//! - `<id>`, `<id>/<ref-or-rev>`, `<id>/<ref>/<rev>` - Registry alias
//! - `github:<owner>/<repo>(/<ref-or-rev>)(?ref=..&rev=..&dir=..)` - GitHub
//! - `git+https://..`, `git+ssh://..`, `git://..`, `file://..` with
//!   `?ref=..&rev=..&dir=..` - Git URL
//! - `http(s)://../<name>.tar.xz(?hash=<sri>&dir=..)` - Tarball (also `file://`)
//! - `/abs/path(?ref=..&rev=..&dir=..)` - Local path; relative paths (`./x`,
//!   `../x`, `.`) only when explicitly allowed

use crate::error::Result;
use crate::error::flakeref::bad_ref;
use crate::hash::{Hash, HashAlgorithm};

use super::{DEFAULT_REF, FlakeRef, Location, is_tarball_uri};

const GIT_SCHEMES: &[&str] = &["git+https", "git+ssh", "git+file", "git", "file"];
const TARBALL_SCHEMES: &[&str] = &["http", "https", "file"];

/// `[a-zA-Z][a-zA-Z0-9_-]*`
pub fn is_flake_id(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// `[a-zA-Z0-9][a-zA-Z0-9_.-]*`, excluding anything that reads as a commit hash
pub fn is_ref_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        && !Hash::is_base16(s, HashAlgorithm::Sha1)
        && !s.ends_with(".lock")
        && !s.contains("..")
}

fn is_owner_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_repo_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn is_subdir(s: &str) -> bool {
    !s.starts_with('/')
        && !s.ends_with('/')
        && s.split('/').all(|part| {
            !part.is_empty()
                && part != "."
                && part != ".."
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        })
}

/// Query parameters recognised by at least one reference kind
#[derive(Debug, Default)]
struct Params {
    git_ref: Option<String>,
    rev: Option<String>,
    hash: Option<String>,
    dir: Option<String>,
}

impl Params {
    fn parse(input: &str, query: Option<&str>, allowed: &[&str]) -> Result<Self> {
        let mut params = Params::default();
        let Some(query) = query else {
            return Ok(params);
        };

        for pair in query.split('&') {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| bad_ref(input, format!("malformed query parameter '{pair}'")))?;

            if !allowed.contains(&key) {
                return Err(bad_ref(input, format!("unsupported query parameter '{key}'")));
            }
            if value.is_empty() {
                return Err(bad_ref(input, format!("empty value for '{key}'")));
            }

            let slot = match key {
                "ref" => &mut params.git_ref,
                "rev" => &mut params.rev,
                "hash" => &mut params.hash,
                _ => &mut params.dir,
            };
            if slot.replace(value.to_string()).is_some() {
                return Err(bad_ref(input, format!("duplicate query parameter '{key}'")));
            }
        }

        Ok(params)
    }

    /// Validate `ref`, `rev` and `dir` and apply them to `flake_ref`
    fn apply(self, input: &str, mut flake_ref: FlakeRef) -> Result<FlakeRef> {
        if let Some(git_ref) = self.git_ref {
            if !is_ref_name(&git_ref) {
                return Err(bad_ref(input, format!("invalid Git ref '{git_ref}'")));
            }
            flake_ref.git_ref = Some(git_ref);
        }
        if let Some(rev) = self.rev {
            flake_ref.rev = Some(parse_rev(input, &rev)?);
        }
        if let Some(dir) = self.dir {
            if !is_subdir(&dir) {
                return Err(bad_ref(input, format!("invalid subdirectory '{dir}'")));
            }
            flake_ref.subdir = dir;
        }
        Ok(flake_ref)
    }
}

fn parse_rev(input: &str, rev: &str) -> Result<Hash> {
    Hash::parse_base16(rev, HashAlgorithm::Sha1)
        .map_err(|_| bad_ref(input, format!("invalid Git revision '{rev}'")))
}

/// Parse a reference from text
pub fn parse(input: &str, allow_relative: bool) -> Result<FlakeRef> {
    if input.is_empty() {
        return Err(bad_ref(input, "empty flake reference"));
    }
    if input.chars().any(char::is_whitespace) {
        return Err(bad_ref(input, "flake references cannot contain whitespace"));
    }
    if input.contains('#') {
        return Err(bad_ref(input, "unexpected '#' in flake reference"));
    }

    let (main, query) = match input.split_once('?') {
        Some((main, query)) => (main, Some(query)),
        None => (input, None),
    };

    if let Some(rest) = main.strip_prefix("github:") {
        return parse_github(input, rest, query);
    }

    if let Some((scheme, rest)) = main.split_once("://") {
        if rest.is_empty() {
            return Err(bad_ref(input, "URL has no location"));
        }
        if TARBALL_SCHEMES.contains(&scheme) && is_tarball_uri(main) {
            return parse_tarball(input, main, query);
        }
        if GIT_SCHEMES.contains(&scheme) {
            return parse_git(input, main, query);
        }
        if TARBALL_SCHEMES.contains(&scheme) {
            return Err(bad_ref(
                input,
                "plain HTTP URLs must name an archive or use the 'git+' prefix",
            ));
        }
        return Err(bad_ref(input, format!("unsupported URL scheme '{scheme}'")));
    }

    if main.starts_with('/') {
        return parse_path(input, main, query);
    }

    if main == "." || main == ".." || main.starts_with("./") || main.starts_with("../") {
        if !allow_relative {
            return Err(bad_ref(input, "relative paths are not allowed here"));
        }
        return parse_path(input, main, query);
    }

    parse_alias(input, main, query)
}

fn parse_alias(input: &str, main: &str, query: Option<&str>) -> Result<FlakeRef> {
    if query.is_some() {
        return Err(bad_ref(input, "aliases do not take query parameters"));
    }

    let segments: Vec<&str> = main.split('/').collect();
    let (alias, git_ref, rev) = match segments.as_slice() {
        [alias] => (*alias, None, None),
        [alias, seg] if Hash::is_base16(seg, HashAlgorithm::Sha1) => (*alias, None, Some(*seg)),
        [alias, seg] => (*alias, Some(*seg), None),
        [alias, git_ref, rev] => (*alias, Some(*git_ref), Some(*rev)),
        _ => return Err(bad_ref(input, "too many path segments in alias")),
    };

    if !is_flake_id(alias) {
        return Err(bad_ref(input, format!("invalid flake identifier '{alias}'")));
    }

    let mut flake_ref = FlakeRef::alias(alias);
    if let Some(git_ref) = git_ref {
        if !is_ref_name(git_ref) {
            return Err(bad_ref(input, format!("invalid Git ref '{git_ref}'")));
        }
        flake_ref.git_ref = Some(git_ref.to_string());
    }
    if let Some(rev) = rev {
        flake_ref.rev = Some(parse_rev(input, rev)?);
    }
    Ok(flake_ref)
}

fn parse_github(input: &str, rest: &str, query: Option<&str>) -> Result<FlakeRef> {
    let segments: Vec<&str> = rest.split('/').collect();
    let (owner, repo, extra) = match segments.as_slice() {
        [owner, repo] => (*owner, *repo, None),
        [owner, repo, extra] => (*owner, *repo, Some(*extra)),
        [_] => return Err(bad_ref(input, "missing repository name")),
        _ => return Err(bad_ref(input, "too many path segments")),
    };

    if !is_owner_name(owner) {
        return Err(bad_ref(input, format!("invalid GitHub owner '{owner}'")));
    }
    if !is_repo_name(repo) {
        return Err(bad_ref(input, format!("invalid GitHub repository '{repo}'")));
    }

    let mut params = Params::parse(input, query, &["ref", "rev", "dir"])?;

    if let Some(extra) = extra {
        let slot = if Hash::is_base16(extra, HashAlgorithm::Sha1) {
            &mut params.rev
        } else {
            &mut params.git_ref
        };
        if slot.replace(extra.to_string()).is_some() {
            return Err(bad_ref(input, "ref or rev given both in the path and the query"));
        }
    }

    let base = FlakeRef {
        location: Location::GitHub {
            owner: owner.to_string(),
            repo: repo.to_string(),
        },
        git_ref: None,
        rev: None,
        subdir: String::new(),
    };
    Ok(with_default_ref(params.apply(input, base)?))
}

fn parse_git(input: &str, uri: &str, query: Option<&str>) -> Result<FlakeRef> {
    let params = Params::parse(input, query, &["ref", "rev", "dir"])?;
    let base = FlakeRef {
        location: Location::Git {
            uri: uri.to_string(),
        },
        git_ref: None,
        rev: None,
        subdir: String::new(),
    };
    Ok(with_default_ref(params.apply(input, base)?))
}

fn parse_tarball(input: &str, uri: &str, query: Option<&str>) -> Result<FlakeRef> {
    let mut params = Params::parse(input, query, &["hash", "dir"])?;
    let mut flake_ref = FlakeRef::tarball(uri);
    if let Some(hash) = params.hash.take() {
        flake_ref.rev = Some(Hash::parse_sri(&hash)?);
    }
    params.apply(input, flake_ref)
}

fn parse_path(input: &str, path: &str, query: Option<&str>) -> Result<FlakeRef> {
    let params = Params::parse(input, query, &["ref", "rev", "dir"])?;
    let flake_ref = params.apply(input, FlakeRef::path(path))?;

    // An explicit ref or rev replaces the working tree sentinel
    if flake_ref.git_ref.is_some() && flake_ref.is_dirty() {
        return Ok(FlakeRef {
            rev: None,
            ..flake_ref
        });
    }
    Ok(flake_ref)
}

fn with_default_ref(mut flake_ref: FlakeRef) -> FlakeRef {
    if flake_ref.git_ref.is_none() && flake_ref.rev.is_none() {
        flake_ref.git_ref = Some(DEFAULT_REF.to_string());
    }
    flake_ref
}
