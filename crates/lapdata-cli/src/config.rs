//! CLI configuration file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Defaults for the global flags; each flag overrides its field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Graph snapshot file
    pub db: PathBuf,
    /// Settings JSON (`descriptors` / `attributes` lists)
    pub settings: Option<PathBuf>,
    /// Keep default parts of a record when `store --id` replaces it
    pub keep_default: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db: PathBuf::from("lapdata.lapg"),
            settings: None,
            keep_default: false,
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn with_overrides(mut self, db: Option<PathBuf>, settings: Option<PathBuf>) -> Self {
        if let Some(db) = db {
            self.db = db;
        }
        if settings.is_some() {
            self.settings = settings;
        }
        self
    }
}
