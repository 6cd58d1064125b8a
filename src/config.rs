//! Pipeline configuration
//!
//! Paths for the three raw inputs and the derived-artifact directory.
//! Resolution order: CLI flags, then `REVIEWFLOW_DATA_DIR`, then an optional
//! TOML file, then defaults relative to the current directory.

use crate::error::{ReviewFlowError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names of the derived artifacts inside the data directory.
pub const FLOW_TABLE_FILE: &str = "Preprocessed_Sankey_Data.csv";
pub const ENRICHED_TABLE_FILE: &str = "Merged_Reviews_With_Features.csv";

/// Pipeline paths, deserializable from a TOML config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// App features reference table
    pub features: PathBuf,
    /// Raw review table
    pub reviews: PathBuf,
    /// Human-labeled training subset
    pub labeled: PathBuf,
    /// Directory for derived artifacts
    pub data_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            features: PathBuf::from("Features1.csv"),
            reviews: PathBuf::from("AppReviews.csv"),
            labeled: PathBuf::from("Labeled_Reviews.csv"),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| ReviewFlowError::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the data directory from the environment, falling back to the
    /// configured value.
    pub fn resolved_data_dir(&self) -> PathBuf {
        std::env::var("REVIEWFLOW_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| self.data_dir.clone())
    }

    /// Path to the derived flow table.
    pub fn flow_table_path(&self) -> PathBuf {
        self.resolved_data_dir().join(FLOW_TABLE_FILE)
    }

    /// Path to the derived enriched review table.
    pub fn enriched_table_path(&self) -> PathBuf {
        self.resolved_data_dir().join(ENRICHED_TABLE_FILE)
    }
}
