use anyhow::Result;
use std::path::{Path, PathBuf};

pub const BASE_PATH_ENV: &str = "MOVIEBOX_BASE_PATH";

/// Base directory override for containers, if set.
pub fn container_base_path() -> Option<PathBuf> {
    std::env::var(BASE_PATH_ENV).ok().filter(|v| !v.is_empty()).map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("moviebox");
        Ok(Self::from_base(base_dir))
    }

    /// Config files live directly in `base`, logs in `base/logs`.
    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            log_dir: base.join("logs"),
            config_dir: base,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn session_file(&self) -> PathBuf {
        self.config_dir.join("session.toml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("moviebox.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(base) = container_base_path() {
            return Self::from_base(base);
        }

        // Platform-specific paths (e.g., ~/.config/moviebox on Linux)
        Self::new().unwrap_or_else(|_| Self::from_base(".moviebox"))
    }
}
