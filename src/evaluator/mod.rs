//! Flake evaluation
//!
//! Resolution only needs a flake's declared metadata and requirements; what a
//! flake provides is opaque. An [`Evaluator`] turns a fetched tree into an
//! [`Evaluation`].

pub mod manifest;

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::flakeref::{FlakeAlias, FlakeId, FlakeRef};

pub use manifest::{MANIFEST_FILE, ManifestEvaluator};

/// Declared metadata of one flake
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub id: FlakeId,
    pub description: String,
    pub requires: Vec<FlakeRef>,
    pub non_flake_requires: BTreeMap<FlakeAlias, FlakeRef>,
    pub provides: serde_json::Value,
}

/// Evaluates the flake found at `path/subdir`
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, path: &Path, subdir: &str) -> Result<Evaluation>;
}
