//! Evaluator reading declarative `flake.yaml` manifests
//!
//! ```yaml
//! name: dwarffs
//! description: A filesystem that fetches DWARF debug info from the Internet on demand
//! requires:
//!   - nixpkgs
//! nonFlakeRequires:
//!   hello: https://example.org/hello.tar.gz
//! provides:
//!   packages: [dwarffs]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::common::fs::read_optional;
use crate::error::Result;
use crate::error::resolve::evaluation_failed;
use crate::flakeref::{FlakeAlias, FlakeRef, is_flake_id};

use super::{Evaluation, Evaluator};

/// Manifest file name at the root of a flake
pub const MANIFEST_FILE: &str = "flake.yaml";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Manifest {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    requires: Vec<FlakeRef>,
    #[serde(default)]
    non_flake_requires: BTreeMap<FlakeAlias, FlakeRef>,
    #[serde(default)]
    provides: serde_yaml::Value,
}

/// Reads `flake.yaml` from the flake directory
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestEvaluator;

impl ManifestEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Parse a manifest; `origin` names the file in error messages
    pub fn parse(content: &str, origin: &Path) -> Result<Evaluation> {
        let fail = |reason: String| evaluation_failed(origin.display(), reason);

        let manifest: Manifest = serde_yaml::from_str(content).map_err(|e| fail(e.to_string()))?;

        if !is_flake_id(&manifest.name) {
            return Err(fail(format!("invalid flake name '{}'", manifest.name)));
        }
        if let Some(alias) = manifest
            .non_flake_requires
            .keys()
            .find(|alias| !is_flake_id(alias))
        {
            return Err(fail(format!("invalid non-flake alias '{alias}'")));
        }

        let provides = serde_json::to_value(&manifest.provides)
            .map_err(|e| fail(format!("unsupported value in 'provides': {e}")))?;

        Ok(Evaluation {
            id: manifest.name,
            description: manifest.description.unwrap_or_default(),
            requires: manifest.requires,
            non_flake_requires: manifest.non_flake_requires,
            provides,
        })
    }
}

impl Evaluator for ManifestEvaluator {
    fn evaluate(&self, path: &Path, subdir: &str) -> Result<Evaluation> {
        let manifest_path = path.join(subdir).join(MANIFEST_FILE);
        tracing::debug!(path = %manifest_path.display(), "reading flake manifest");

        let content = read_optional(&manifest_path)?.ok_or_else(|| {
            evaluation_failed(
                path.join(subdir).display(),
                format!("no {MANIFEST_FILE} found"),
            )
        })?;
        Self::parse(&content, &manifest_path)
    }
}
