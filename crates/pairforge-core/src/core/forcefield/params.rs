use super::potential_map::PairPotential;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GlobalParams {
    /// Interaction range (cutoff) in Angstroms.
    pub range: f64,
    /// Relative dielectric constant; electrostatics are disabled when absent.
    #[serde(default)]
    pub dielectric: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    #[serde(default)]
    pub charge: f64,
    #[serde(default)]
    pub epsilon: Option<f64>,
    #[serde(default)]
    pub sigma: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PairParam {
    pub a: String,
    pub b: String,
    #[serde(flatten)]
    pub potential: PairPotential,
}

/// Raw pair-interaction parameters as read from a TOML file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NonBondedParams {
    pub globals: GlobalParams,
    pub types: Vec<TypeParam>,
    #[serde(default)]
    pub pairs: Vec<PairParam>,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unknown atom type '{0}'")]
    UnknownType(String),
    #[error("Duplicate atom type '{0}'")]
    DuplicateType(String),
    #[error("Atom type '{0}' must define both epsilon and sigma, or neither")]
    IncompleteLennardJones(String),
    #[error("Interaction range must be finite and positive, got {0}")]
    InvalidRange(f64),
}

impl NonBondedParams {
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}
