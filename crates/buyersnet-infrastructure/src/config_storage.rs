//! TOML storage for [`AppConfig`].

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use buyersnet_core::BuyersNetError;
use buyersnet_core::config::AppConfig;
use buyersnet_core::error::Result;

use crate::paths::BuyersNetPaths;

/// Reads and writes `config.toml`.
///
/// A missing or empty file loads as [`AppConfig::default`]. Saves go through
/// a temporary file in the same directory followed by a rename, so readers
/// never observe a half-written file.
pub struct TomlConfigStorage {
    path: PathBuf,
}

impl TomlConfigStorage {
    /// Storage at the platform default location.
    pub fn new_default() -> Result<Self> {
        Ok(Self::with_path(BuyersNetPaths::config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            tracing::debug!("No config at {:?}, using defaults", self.path);
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            BuyersNetError::io(format!(
                "Failed to read config file at {:?}: {}",
                self.path, e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| BuyersNetError::config("Config path has no parent directory"))?;
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(config)?;

        let tmp_path = self.path.with_extension("toml.tmp");
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        tracing::debug!("Saved config to {:?}", self.path);
        Ok(())
    }
}
