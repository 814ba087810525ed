//! Application configuration management.
//!
//! Configuration is stored at `~/.config/mapmark/config.json` and holds the
//! remote endpoint URL and the optional boundary-file path. The endpoint
//! can be overridden per invocation with `MAPMARK_API_URL`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "mapmark";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment override for the endpoint URL
pub const API_URL_ENV: &str = "MAPMARK_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Web-app endpoint (the deployed script URL ending in /exec).
    pub api_url: Option<String>,
    /// District-boundary GeoJSON document, if one is available locally.
    pub boundary_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                config.api_url = Some(url);
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_endpoint() {
        let config = Config::default();
        assert!(config.api_url.is_none());
        assert!(config.boundary_file.is_none());
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = Config {
            api_url: Some("https://script.example.com/exec".to_string()),
            boundary_file: Some(PathBuf::from("districts.geojson")),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.api_url, config.api_url);
        assert_eq!(back.boundary_file, config.boundary_file);
    }
}
