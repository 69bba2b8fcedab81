//! Configuration storage operations

use crate::{models::ProbeConfig, Result};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

pub struct ConfigStorage {
    config_dir: PathBuf,
}

impl ConfigStorage {
    pub fn new(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Load `config.json`, falling back to defaults when it is missing or empty
    pub fn load(&self) -> Result<ProbeConfig> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(ProbeConfig::default());
        }

        Self::load_file(&config_path)
    }

    /// Load a config from an explicit file path
    pub fn load_file(path: &Path) -> Result<ProbeConfig> {
        let content = std::fs::read_to_string(path)?;

        // Handle empty file case
        if content.trim().is_empty() {
            return Ok(ProbeConfig::default());
        }

        let config: ProbeConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, config: &ProbeConfig) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(self.config_path(), content)?;

        Ok(())
    }
}
