//! Pipeline configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! asset_id = 12345
//! counter = 1
//! tree_height = 20
//! output_path = "input/input_1_data.json"
//!
//! [[leaves]]
//! key = 7
//! value = "42"
//! ```

use std::path::{Path, PathBuf};

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use asset_zk_circuits::{field_from_decimal, DEFAULT_HEIGHT, MAX_HEIGHT};

use crate::error::PipelineError;

pub const DEFAULT_ASSET_ID: u64 = 12345;
pub const DEFAULT_COUNTER: u64 = 1;
pub const DEFAULT_OUTPUT_PATH: &str = "input/input_1_data.json";

/// A pre-existing tree entry: integer key, decimal field value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafEntry {
    pub key: u64,
    pub value: String,
}

impl LeafEntry {
    pub fn to_fields(&self) -> Result<(Fr, Fr), PipelineError> {
        let value = field_from_decimal(&self.value)
            .map_err(|e| PipelineError::Config(format!("leaf {}: {e}", self.key)))?;
        Ok((Fr::from(self.key), value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub asset_id: u64,
    pub counter: u64,
    pub tree_height: usize,
    pub output_path: PathBuf,
    pub leaves: Vec<LeafEntry>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            asset_id: DEFAULT_ASSET_ID,
            counter: DEFAULT_COUNTER,
            tree_height: DEFAULT_HEIGHT,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            leaves: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, PipelineError> {
        let config: Self =
            toml::from_str(input).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            PipelineError::Config(msg) => {
                PipelineError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Load `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, PipelineError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.tree_height == 0 || self.tree_height > MAX_HEIGHT {
            return Err(PipelineError::Config(format!(
                "tree_height must be in 1..={MAX_HEIGHT}, got {}",
                self.tree_height
            )));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(PipelineError::Config("output_path must not be empty".into()));
        }
        for leaf in &self.leaves {
            leaf.to_fields()?;
        }
        Ok(())
    }

    pub fn asset_id_field(&self) -> Fr {
        Fr::from(self.asset_id)
    }

    /// Configured leaves as field pairs.
    pub fn leaf_fields(&self) -> Result<Vec<(Fr, Fr)>, PipelineError> {
        self.leaves.iter().map(LeafEntry::to_fields).collect()
    }
}
