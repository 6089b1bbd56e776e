use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

pub const DEFAULT_API_ROOT: &str = "https://candy.freefeed.net";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const ENV_API_ROOT: &str = "ROADMAP_API_ROOT";
pub const ENV_AUTH_TOKEN: &str = "ROADMAP_AUTH_TOKEN";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_root: Option<String>,
    pub auth_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_root: Some(DEFAULT_API_ROOT.to_string()),
            auth_token: None,
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            log_file: None,
        }
    }

    /// Load from the user config dir, then apply environment overrides.
    ///
    /// On first run a default file is written so there is something to edit.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            if let Err(e) = Self::new().save() {
                tracing::warn!(error = %e, path = %config_path.display(), "Could not write default config");
            }
        }
        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Environment wins over the file. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(root) = non_empty(ENV_API_ROOT) {
            self.api_root = Some(root);
        }
        if let Some(token) = non_empty(ENV_AUTH_TOKEN) {
            self.auth_token = Some(token);
        }
    }

    pub fn api_root(&self) -> String {
        self.api_root
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(DEFAULT_API_ROOT)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn auth_token(&self) -> Option<String> {
        self.auth_token.clone().filter(|t| !t.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .request_timeout_secs
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Where the terminal client writes its log.
    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::get_config_dir()?.join("roadmap.log")),
        }
    }

    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("roadmap"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.json"))
    }
}
