//! Configuration management
//!
//! Settings live in `config.toml` under the platform config directory and are
//! written out with defaults the first time the client starts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "jamendo-rs";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub backend: BackendConfig,
    pub player: PlayerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Jamendo API client id; `JAMENDO_CLIENT_ID` takes precedence
    pub client_id: String,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// How often the audio engine reports position while playing
    pub status_interval_ms: u64,
    /// `previous` restarts the track instead once playback is past this point
    pub restart_threshold_ms: u64,
    pub seek_step_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jamendo.com/v3.0".to_string(),
            client_id: String::new(),
            page_size: 40,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: 400,
            restart_threshold_ms: 3000,
            seek_step_ms: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let directory = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("logs");
        Self { directory }
    }
}

impl Config {
    /// Load from the default location, creating the file on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(APP_DIR);

        Ok(config_dir.join(CONFIG_FILE))
    }

    /// Directory for session and cache files.
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))
    }
}
