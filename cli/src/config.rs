// Persistent defaults for the tman CLI
//
// Stored as JSON in:
// - macOS: ~/Library/Application Support/tman/config.json
// - Linux: ~/.config/tman/config.json
// - Windows: %APPDATA%\tman\config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tman_core::config::DEFAULT_RING_EPOCHS;
use tman_core::GrowthScheduler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory receiving checkpoints and the run log
    pub output_dir: String,

    /// Seed used when `--seed` is not given
    pub seed: u64,

    /// Epochs for a static ring when `--epochs` is not given
    pub ring_epochs: u64,

    /// Growth interval when `--interval` is not given
    pub interval: u64,

    /// Mirror logs into `<output_dir>/tman.log`
    pub log_file: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: "tman-output".to_string(),
            seed: 0,
            ring_epochs: DEFAULT_RING_EPOCHS,
            interval: GrowthScheduler::DEFAULT_INTERVAL,
            log_file: true,
        }
    }
}

impl Settings {
    /// Get the config directory path (cross-platform)
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("tman");

        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir)
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load settings from the user config file, creating it with defaults
    pub fn load() -> Result<Self> {
        let path = Self::config_file()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let settings = Settings::default();
            settings.save_to(&path)?;
            Ok(settings)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Set a value in memory; the caller persists it
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_dir" => {
                if value.is_empty() {
                    anyhow::bail!("output_dir cannot be empty");
                }
                self.output_dir = value.to_string();
            }
            "seed" => {
                self.seed = value.parse().context("Invalid seed")?;
            }
            "ring_epochs" => {
                let epochs: u64 = value.parse().context("Invalid number")?;
                if epochs == 0 {
                    anyhow::bail!("ring_epochs must be at least 1");
                }
                self.ring_epochs = epochs;
            }
            "interval" => {
                let interval: u64 = value.parse().context("Invalid number")?;
                if interval == 0 {
                    anyhow::bail!("interval must be at least 1");
                }
                self.interval = interval;
            }
            "log_file" => {
                self.log_file = value.parse().context("Invalid boolean value")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "output_dir" => Some(self.output_dir.clone()),
            "seed" => Some(self.seed.to_string()),
            "ring_epochs" => Some(self.ring_epochs.to_string()),
            "interval" => Some(self.interval.to_string()),
            "log_file" => Some(self.log_file.to_string()),
            _ => None,
        }
    }

    pub fn list(&self) -> Vec<(String, String)> {
        ["output_dir", "seed", "ring_epochs", "interval", "log_file"]
            .iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }
}
