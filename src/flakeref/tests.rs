use proptest::prelude::*;

use super::*;

const REV: &str = "e72daba8250068216d79d2aeef40d4d95aff6666";
const OTHER_REV: &str = "0123456789abcdef0123456789abcdef01234567";

fn rev(hex: &str) -> Hash {
    Hash::parse_base16(hex, HashAlgorithm::Sha1).unwrap()
}

fn parse(input: &str) -> FlakeRef {
    FlakeRef::parse(input, false).unwrap()
}

#[test]
fn test_parse_github_with_ref() {
    let flake_ref = parse("github:edolstra/dwarffs/unstable");
    assert_eq!(
        flake_ref.location,
        Location::GitHub {
            owner: "edolstra".to_string(),
            repo: "dwarffs".to_string()
        }
    );
    assert_eq!(flake_ref.git_ref.as_deref(), Some("unstable"));
    assert_eq!(flake_ref.rev, None);
    assert!(flake_ref.is_direct());
    assert!(!flake_ref.is_immutable());
}

#[test]
fn test_parse_github_defaults_to_master() {
    let flake_ref = parse("github:edolstra/dwarffs");
    assert_eq!(flake_ref.git_ref.as_deref(), Some(DEFAULT_REF));
    assert_eq!(flake_ref, FlakeRef::github("edolstra", "dwarffs"));
}

#[test]
fn test_parse_github_trailing_rev() {
    let flake_ref = parse(&format!("github:edolstra/dwarffs/{REV}"));
    assert_eq!(flake_ref.git_ref, None);
    assert_eq!(flake_ref.rev, Some(rev(REV)));
    assert!(flake_ref.is_immutable());
}

#[test]
fn test_parse_github_ref_and_rev() {
    let input = format!("github:NixOS/nixpkgs/release-19.09?rev={REV}");
    let flake_ref = parse(&input);
    assert_eq!(flake_ref.git_ref.as_deref(), Some("release-19.09"));
    assert_eq!(flake_ref.rev, Some(rev(REV)));
    assert_eq!(flake_ref.to_string(), input);
}

#[test]
fn test_parse_github_rejects_conflicts() {
    assert!(FlakeRef::parse("github:a/b/dev?ref=main", false).is_err());
    assert!(FlakeRef::parse(&format!("github:a/b/{REV}?rev={REV}"), false).is_err());
    assert!(FlakeRef::parse("github:edolstra", false).is_err());
    assert!(FlakeRef::parse("github:a/b/c/d", false).is_err());
    assert!(FlakeRef::parse("github:a/b?hash=sha256-abc", false).is_err());
}

#[test]
fn test_parse_path_pinned() {
    let flake_ref = parse(&format!("/path/to/repo?rev={REV}"));
    assert_eq!(
        flake_ref.location,
        Location::Path {
            path: "/path/to/repo".to_string()
        }
    );
    assert_eq!(flake_ref.rev, Some(rev(REV)));
    assert_eq!(flake_ref.git_ref, None);
    assert!(flake_ref.is_immutable());
    assert!(!flake_ref.is_dirty());
}

#[test]
fn test_parse_path_dirty() {
    let flake_ref = parse("/path/to/repo");
    assert_eq!(flake_ref.rev, Some(Hash::empty(HashAlgorithm::Sha1)));
    assert!(flake_ref.is_dirty());
    assert!(!flake_ref.is_immutable());
    assert_eq!(flake_ref, FlakeRef::path("/path/to/repo"));
    assert_eq!(flake_ref.to_string(), "/path/to/repo");
}

#[test]
fn test_parse_path_with_ref_is_clean() {
    let flake_ref = parse("/path/to/repo?ref=dev");
    assert_eq!(flake_ref.git_ref.as_deref(), Some("dev"));
    assert_eq!(flake_ref.rev, None);
    assert!(!flake_ref.is_dirty());
    assert_eq!(flake_ref, FlakeRef::path("/path/to/repo").with_ref("dev"));
}

#[test]
fn test_dirty_sentinel_drops_ref() {
    let flake_ref = FlakeRef::path("/path/to/repo")
        .with_ref("dev")
        .with_rev(Hash::empty(HashAlgorithm::Sha1));
    assert!(flake_ref.is_dirty());
    assert_eq!(flake_ref.git_ref, None);
    assert_eq!(flake_ref, FlakeRef::path("/path/to/repo"));
    assert_eq!(parse(&flake_ref.to_string()), flake_ref);
}

#[test]
fn test_parse_relative_path() {
    assert!(FlakeRef::parse("./repo", false).is_err());
    assert!(FlakeRef::parse(".", false).is_err());

    let flake_ref = FlakeRef::parse("./repo", true).unwrap();
    assert_eq!(
        flake_ref.location,
        Location::Path {
            path: "./repo".to_string()
        }
    );
    assert!(flake_ref.is_dirty());
    assert!(FlakeRef::parse("..", true).is_ok());
}

#[test]
fn test_parse_git_urls() {
    let flake_ref = parse("git+https://example.org/my/repo.git?ref=dev&dir=sub/flake");
    assert_eq!(
        flake_ref.location,
        Location::Git {
            uri: "git+https://example.org/my/repo.git".to_string()
        }
    );
    assert_eq!(flake_ref.git_ref.as_deref(), Some("dev"));
    assert_eq!(flake_ref.subdir, "sub/flake");
    assert!(!flake_ref.is_tarball());

    let flake_ref = parse("git://example.org/repo");
    assert_eq!(flake_ref.git_ref.as_deref(), Some(DEFAULT_REF));

    let flake_ref = parse(&format!("file:///srv/repo?rev={REV}"));
    assert_eq!(flake_ref.git_ref, None);
    assert!(flake_ref.is_immutable());
    assert_eq!(flake_ref.kind(), "git");
}

#[test]
fn test_parse_tarball() {
    let input = "https://example.org/src.tar.xz?hash=sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=";
    let flake_ref = parse(input);
    assert!(flake_ref.is_tarball());
    assert_eq!(flake_ref.kind(), "tarball");
    assert_eq!(flake_ref.git_ref, None);
    assert_eq!(
        flake_ref.rev.as_ref().map(Hash::algorithm),
        Some(HashAlgorithm::Sha256)
    );
    assert!(flake_ref.is_immutable());
    assert!(!flake_ref.supports_rev_count());
    assert_eq!(flake_ref.to_string(), input);
}

#[test]
fn test_parse_tarball_hex_hash_normalizes_to_sri() {
    let hex = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    let flake_ref = parse(&format!("https://example.org/src.tgz?hash=sha256-{hex}"));
    assert_eq!(
        flake_ref.to_string(),
        "https://example.org/src.tgz?hash=sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
    );
}

#[test]
fn test_parse_rejects_plain_http_and_unknown_schemes() {
    assert!(FlakeRef::parse("https://example.org/repo", false).is_err());
    assert!(FlakeRef::parse("ftp://example.org/src.tar.gz", false).is_err());
    assert!(FlakeRef::parse("https://example.org/src.tar.gz?ref=dev", false).is_err());
}

#[test]
fn test_parse_aliases() {
    let flake_ref = parse("nixpkgs");
    assert_eq!(flake_ref, FlakeRef::alias("nixpkgs"));
    assert!(!flake_ref.is_direct());

    let flake_ref = parse("nixpkgs/19.09");
    assert_eq!(flake_ref.git_ref.as_deref(), Some("19.09"));
    assert_eq!(flake_ref.rev, None);

    let flake_ref = parse(&format!("nixpkgs/{REV}"));
    assert_eq!(flake_ref.git_ref, None);
    assert_eq!(flake_ref.rev, Some(rev(REV)));
    assert!(!flake_ref.is_immutable());

    let flake_ref = parse(&format!("nixpkgs/19.09/{REV}"));
    assert_eq!(flake_ref.git_ref.as_deref(), Some("19.09"));
    assert_eq!(flake_ref.rev, Some(rev(REV)));
}

#[test]
fn test_parse_rejects_malformed_input() {
    let cases = [
        "",
        "nix pkgs",
        "1nixpkgs",
        "nixpkgs/a/b/c",
        "nixpkgs/dev/not-a-rev",
        "nixpkgs?ref=dev",
        "/repo?ref=dev&ref=main",
        "/repo?branch=dev",
        "/repo?rev=abc",
        "/repo?dir=../escape",
        "/repo#frag",
        "git+https://",
    ];
    for input in cases {
        let err = FlakeRef::parse(input, true).unwrap_err();
        assert!(
            matches!(err, FlakeError::BadFlakeRef { .. }),
            "expected BadFlakeRef for {input:?}, got {err:?}"
        );
    }
}

#[test]
fn test_rev_is_case_insensitive_and_printed_lowercase() {
    let flake_ref = parse(&format!("github:a/b/{}", REV.to_uppercase()));
    assert_eq!(flake_ref.to_string(), format!("github:a/b/{REV}"));
}

#[test]
fn test_base_ref_strips_pins() {
    let flake_ref = parse(&format!("github:a/b/dev?rev={REV}&dir=sub"));
    let base = flake_ref.base_ref();
    assert_eq!(base.git_ref, None);
    assert_eq!(base.rev, None);
    assert_eq!(base.subdir, "sub");
    assert!(base.contains(&flake_ref));
}

#[test]
fn test_contains() {
    let unpinned = FlakeRef::github("a", "b").base_ref();
    let master = FlakeRef::github("a", "b");
    let pinned = FlakeRef::github("a", "b").with_rev(rev(REV));
    let other_branch = FlakeRef::github("a", "b").with_ref("dev");

    assert!(unpinned.contains(&master));
    assert!(unpinned.contains(&pinned));
    assert!(master.contains(&pinned));
    assert!(!master.contains(&other_branch));
    assert!(!pinned.contains(&master));
    assert!(pinned.contains(&pinned));
    assert!(!pinned.contains(&FlakeRef::github("a", "b").with_rev(rev(OTHER_REV))));
    assert!(!master.contains(&FlakeRef::github("a", "c")));
    assert!(!master.contains(&master.clone().with_subdir("x")));
}

#[test]
fn test_apply_alias_override_replaces_both_fields() {
    let target = FlakeRef::github("NixOS", "nixpkgs")
        .with_ref("release-19.03")
        .with_rev(rev(OTHER_REV));

    let plain = FlakeRef::alias("nixpkgs");
    assert_eq!(target.clone().apply_alias_override(&plain), target);

    let with_ref = FlakeRef::alias("nixpkgs").with_ref("19.09");
    let resolved = target.clone().apply_alias_override(&with_ref);
    assert_eq!(resolved.git_ref.as_deref(), Some("19.09"));
    assert_eq!(resolved.rev, None);

    let with_rev = FlakeRef::alias("nixpkgs").with_rev(rev(REV));
    let resolved = target.apply_alias_override(&with_rev);
    assert_eq!(resolved.git_ref, None);
    assert_eq!(resolved.rev, Some(rev(REV)));
}

#[test]
fn test_ordering_is_total_over_fields() {
    let a = FlakeRef::github("a", "b");
    let b = FlakeRef::github("a", "b").with_rev(rev(REV));
    assert!(a < b);
    assert!(FlakeRef::alias("z") < FlakeRef::github("a", "a"));
}

#[test]
fn test_serde_as_string() {
    let flake_ref = parse(&format!("github:a/b?rev={REV}"));
    let json = serde_json::to_string(&flake_ref).unwrap();
    assert_eq!(json, format!("\"github:a/b/{REV}\""));
    let back: FlakeRef = serde_json::from_str(&json).unwrap();
    assert_eq!(back, flake_ref);

    assert!(serde_json::from_str::<FlakeRef>("\"not a ref\"").is_err());
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,8}"
}

fn ref_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,10}"
}

fn rev_strategy() -> impl Strategy<Value = Hash> {
    prop::collection::vec(any::<u8>(), 20)
        .prop_map(|digest| Hash::from_digest(HashAlgorithm::Sha1, digest).unwrap())
}

fn subdir_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["", "[a-z]{1,6}", "[a-z]{1,6}/[a-z]{1,6}"]
}

fn pins_strategy() -> impl Strategy<Value = (Option<String>, Option<Hash>)> {
    (
        prop::option::of(ref_strategy()),
        prop::option::of(rev_strategy()),
    )
}

/// Canonical references: exactly the values the parser produces
fn flake_ref_strategy() -> impl Strategy<Value = FlakeRef> {

    let alias = (name_strategy(), pins_strategy()).prop_map(|(alias, (git_ref, rev))| FlakeRef {
        location: Location::Alias { alias },
        git_ref,
        rev,
        subdir: String::new(),
    });

    let github = (name_strategy(), name_strategy(), pins_strategy(), subdir_strategy()).prop_map(
        |(owner, repo, (git_ref, rev), subdir)| FlakeRef {
            location: Location::GitHub { owner, repo },
            git_ref: git_ref.or_else(|| rev.is_none().then(|| DEFAULT_REF.to_string())),
            rev,
            subdir,
        },
    );

    let git = (name_strategy(), pins_strategy(), subdir_strategy()).prop_map(
        |(name, (git_ref, rev), subdir)| FlakeRef {
            location: Location::Git {
                uri: format!("git+https://example.org/{name}.git"),
            },
            git_ref: git_ref.or_else(|| rev.is_none().then(|| DEFAULT_REF.to_string())),
            rev,
            subdir,
        },
    );

    let tarball = (
        name_strategy(),
        prop::option::of(prop::collection::vec(any::<u8>(), 32)),
        subdir_strategy(),
    )
        .prop_map(|(name, digest, subdir)| FlakeRef {
            location: Location::Git {
                uri: format!("https://example.org/{name}.tar.gz"),
            },
            git_ref: None,
            rev: digest.and_then(|d| Hash::from_digest(HashAlgorithm::Sha256, d)),
            subdir,
        });

    let path = (name_strategy(), pins_strategy(), subdir_strategy()).prop_map(
        |(name, (git_ref, rev), subdir)| {
            let base = FlakeRef::path(format!("/srv/{name}")).with_subdir(subdir);
            match (git_ref, rev) {
                (None, None) => base,
                (Some(git_ref), rev) => FlakeRef {
                    rev,
                    ..base.with_ref(git_ref)
                },
                (None, Some(rev)) => base.with_rev(rev),
            }
        },
    );

    prop_oneof![alias, github, git, tarball, path]
}

proptest! {
    #[test]
    fn prop_display_parse_round_trip(flake_ref in flake_ref_strategy()) {
        let text = flake_ref.to_string();
        let parsed = FlakeRef::parse(&text, false);
        prop_assert!(parsed.is_ok(), "failed to parse {}", text);
        prop_assert_eq!(parsed.unwrap(), flake_ref);
    }

    #[test]
    fn prop_contains_is_reflexive(flake_ref in flake_ref_strategy()) {
        prop_assert!(flake_ref.contains(&flake_ref));
        prop_assert!(flake_ref.base_ref().contains(&flake_ref));
    }

    #[test]
    fn prop_contains_is_transitive(
        a in flake_ref_strategy(),
        b in flake_ref_strategy(),
        c in flake_ref_strategy(),
    ) {
        // Derive related references so the premise holds often
        for (x, y, z) in [
            (a.base_ref(), a.clone(), a.clone()),
            (a.base_ref(), b.clone(), c.clone()),
            (a.clone(), b, c),
        ] {
            if x.contains(&y) && y.contains(&z) {
                prop_assert!(x.contains(&z));
            }
        }
    }

    #[test]
    fn prop_immutable_contains_only_itself(a in flake_ref_strategy(), b in flake_ref_strategy()) {
        if a.is_immutable() {
            prop_assert!(a.rev.is_some());
            prop_assert_eq!(a.contains(&b), a == b);
        }
        if a.rev.is_none() {
            prop_assert!(!a.is_immutable());
        }
    }
}
