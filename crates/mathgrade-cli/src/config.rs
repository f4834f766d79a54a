//! CLI configuration.
//!
//! An optional `mathgrade.toml` in the working directory (or a path given
//! with `--config`) supplies defaults; the `--store` flag wins over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "mathgrade.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Where the SQLite store lives.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("mathgrade.db")
}

/// Load config from an explicit path, or from `./mathgrade.toml` if present,
/// falling back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<CliConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(CliConfig::default());
            }
            default
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Final store path: flag > config file > built-in default.
pub fn resolve_store_path(flag: Option<PathBuf>, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    Ok(load_config(config_path)?.store_path)
}
