//! Path management for BuyersNet configuration files.
//!
//! ```text
//! ~/.config/buyersnet/         # Config directory (platform default)
//! └── config.toml              # Application configuration
//! ```

use std::path::PathBuf;

use buyersnet_core::BuyersNetError;
use buyersnet_core::error::Result;

const APP_DIR: &str = "buyersnet";
const CONFIG_FILE: &str = "config.toml";

pub struct BuyersNetPaths;

impl BuyersNetPaths {
    /// Returns the BuyersNet configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| BuyersNetError::config("Cannot find config directory"))
    }

    /// Returns the path of `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_lives_in_app_dir() {
        if let Ok(path) = BuyersNetPaths::config_file() {
            assert!(path.ends_with("buyersnet/config.toml"));
        }
    }
}
