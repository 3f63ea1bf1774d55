//! JSON form of the flake registry
//!
//! ```json
//! {
//!   "flakes": {
//!     "nixpkgs": {
//!       "uri": "github:NixOS/nixpkgs"
//!     }
//!   },
//!   "version": 1
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::error::registry::parse_failed;
use crate::flakeref::FlakeRef;

/// Supported registry file version
pub const REGISTRY_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    #[serde(default)]
    flakes: BTreeMap<String, RegistryEntry>,
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistryEntry {
    uri: String,
}

pub fn deserialize_registry(json: &str, path: &Path) -> Result<BTreeMap<FlakeRef, FlakeRef>> {
    let file: RegistryFile =
        serde_json::from_str(json).map_err(|e| parse_failed(path, e.to_string()))?;

    if file.version != REGISTRY_VERSION {
        return Err(parse_failed(
            path,
            format!("unsupported registry version {}", file.version),
        ));
    }

    file.flakes
        .into_iter()
        .map(|(from, entry)| {
            let from = from
                .parse::<FlakeRef>()
                .map_err(|e| parse_failed(path, e.to_string()))?;
            let to = entry
                .uri
                .parse::<FlakeRef>()
                .map_err(|e| parse_failed(path, e.to_string()))?;
            Ok((from, to))
        })
        .collect()
}

pub fn serialize_registry(entries: &BTreeMap<FlakeRef, FlakeRef>) -> Result<String> {
    let file = RegistryFile {
        flakes: entries
            .iter()
            .map(|(from, to)| {
                (
                    from.to_string(),
                    RegistryEntry {
                        uri: to.to_string(),
                    },
                )
            })
            .collect(),
        version: REGISTRY_VERSION,
    };
    let mut json = serde_json::to_string_pretty(&file)?;
    json.push('\n');
    Ok(json)
}
