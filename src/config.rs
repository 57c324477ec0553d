use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Default quote server, a local json-server style endpoint exposing /quotes.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
/// Default reconciliation cadence.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub sync_interval_secs: u64,
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            log_filter: None,
        }
    }
}

impl Config {
    /// Load the config, writing a default file on first run so the
    /// settings are discoverable.
    pub fn load_or_init() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let config = Self::default();
            config.save_to(&path)?;
            return Ok(config);
        }
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("quotebook").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();

        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.sync_interval_secs, DEFAULT_SYNC_INTERVAL_SECS);
        assert_eq!(config.log_filter, None);
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            server_url: "http://quotes.internal:8080".to_string(),
            sync_interval_secs: 300,
            log_filter: Some("debug".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server_url, "http://quotes.internal:8080");
        assert_eq!(loaded.sync_interval_secs, 300);
        assert_eq!(loaded.log_filter, Some("debug".to_string()));
    }
}
