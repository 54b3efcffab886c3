//! Configuration file handling

use serde::Deserialize;
use std::path::Path;

use super::{Error, Result};

/// Name of the optional per-project configuration file
pub const CONFIG_FILE: &str = "checkall.toml";

/// Main configuration structure
///
/// CLI flags override anything set here; anything set here overrides
/// manifest discovery.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Build tool to invoke
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Number of configurations to verify concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Explicit feature list; skips manifest discovery when non-empty
    #[serde(default)]
    pub features: Vec<String>,

    /// Features excluded from the final feature list
    #[serde(default)]
    pub skip: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            jobs: default_jobs(),
            features: Vec::new(),
            skip: Vec::new(),
        }
    }
}

fn default_tool() -> String {
    "cargo".to_string()
}

fn default_jobs() -> usize {
    1
}

impl Config {
    /// Load configuration from `checkall.toml` in the working directory
    ///
    /// Returns default configuration if the file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}
