use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use url::Url;

/// Environment override for the API base URL.
pub const API_URL_ENV: &str = "MOVIEBOX_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Force JSON logs on or off; unset means "JSON when stdout is not a terminal".
    #[serde(default)]
    pub json: Option<bool>,
    /// Also write a daily-rotated log file under the log directory.
    #[serde(default)]
    pub file: bool,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: None,
            file: false,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise start from defaults, then apply
    /// environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            debug!("Loading config from {}", path.display());
            Self::load_from_file(path)?
        } else {
            debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.base_url)
            .map_err(|e| anyhow!("Invalid API base URL {:?}: {}", self.api.base_url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!("API base URL must use http or https, got {}", url.scheme()));
        }
        if self.api.timeout_seconds == 0 {
            return Err(anyhow!("api.timeout_seconds must be greater than 0"));
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.api.base_url)?)
    }
}
