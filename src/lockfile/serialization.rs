//! JSON form of the lock file
//!
//! ```json
//! {
//!   "nonFlakeRequires": {
//!     "hello": {
//!       "uri": "https://example.org/hello.tar.gz?hash=sha256-..."
//!     }
//!   },
//!   "requires": {
//!     "nixpkgs": {
//!       "nonFlakeRequires": {},
//!       "requires": {},
//!       "uri": "github:NixOS/nixpkgs/master?rev=..."
//!     }
//!   },
//!   "version": 1
//! }
//! ```
//!
//! Keys are written in sorted order so that serializing the same lock file
//! twice yields identical bytes.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::error::lockfile::parse_failed;
use crate::flakeref::{FlakeAlias, FlakeId, FlakeRef};

use super::{FlakeEntry, LockFile};

/// Supported lock file version
pub const LOCK_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct LockFileJson {
    #[serde(default)]
    non_flake_requires: BTreeMap<FlakeAlias, NonFlakeJson>,
    #[serde(default)]
    requires: BTreeMap<FlakeId, EntryJson>,
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EntryJson {
    #[serde(default)]
    non_flake_requires: BTreeMap<FlakeAlias, NonFlakeJson>,
    #[serde(default)]
    requires: BTreeMap<FlakeId, EntryJson>,
    uri: FlakeRef,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct NonFlakeJson {
    uri: FlakeRef,
}

pub fn deserialize_lock_file(json: &str, path: &Path) -> Result<LockFile> {
    let file: LockFileJson =
        serde_json::from_str(json).map_err(|e| parse_failed(path, e.to_string()))?;

    if file.version != LOCK_FILE_VERSION {
        return Err(parse_failed(
            path,
            format!("unsupported lock file version {}", file.version),
        ));
    }

    Ok(LockFile {
        flake_entries: entries_from_json(file.requires),
        non_flake_entries: non_flakes_from_json(file.non_flake_requires),
    })
}

pub fn serialize_lock_file(lock_file: &LockFile) -> Result<String> {
    let file = LockFileJson {
        non_flake_requires: non_flakes_to_json(&lock_file.non_flake_entries),
        requires: entries_to_json(&lock_file.flake_entries),
        version: LOCK_FILE_VERSION,
    };
    let mut json = serde_json::to_string_pretty(&file)?;
    json.push('\n');
    Ok(json)
}

fn entries_from_json(entries: BTreeMap<FlakeId, EntryJson>) -> BTreeMap<FlakeId, FlakeEntry> {
    entries
        .into_iter()
        .map(|(id, entry)| {
            let entry = FlakeEntry {
                flake_ref: entry.uri,
                flake_entries: entries_from_json(entry.requires),
                non_flake_entries: non_flakes_from_json(entry.non_flake_requires),
            };
            (id, entry)
        })
        .collect()
}

fn non_flakes_from_json(
    entries: BTreeMap<FlakeAlias, NonFlakeJson>,
) -> BTreeMap<FlakeAlias, FlakeRef> {
    entries
        .into_iter()
        .map(|(alias, entry)| (alias, entry.uri))
        .collect()
}

fn entries_to_json(entries: &BTreeMap<FlakeId, FlakeEntry>) -> BTreeMap<FlakeId, EntryJson> {
    entries
        .iter()
        .map(|(id, entry)| {
            let entry = EntryJson {
                non_flake_requires: non_flakes_to_json(&entry.non_flake_entries),
                requires: entries_to_json(&entry.flake_entries),
                uri: entry.flake_ref.clone(),
            };
            (id.clone(), entry)
        })
        .collect()
}

fn non_flakes_to_json(entries: &BTreeMap<FlakeAlias, FlakeRef>) -> BTreeMap<FlakeAlias, NonFlakeJson> {
    entries
        .iter()
        .map(|(alias, flake_ref)| {
            (
                alias.clone(),
                NonFlakeJson {
                    uri: flake_ref.clone(),
                },
            )
        })
        .collect()
}
