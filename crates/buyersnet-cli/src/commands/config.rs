use std::path::PathBuf;

use anyhow::{Context, Result};
use buyersnet_core::config::AppConfig;
use buyersnet_infrastructure::TomlConfigStorage;
use colored::Colorize;

pub fn storage(path: Option<PathBuf>) -> Result<TomlConfigStorage> {
    match path {
        Some(path) => Ok(TomlConfigStorage::with_path(path)),
        None => TomlConfigStorage::new_default().context("Failed to locate the config directory"),
    }
}

pub fn show(config: &AppConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    print!("{}", rendered);
    Ok(())
}

pub fn init(storage: &TomlConfigStorage) -> Result<()> {
    if storage.path().exists() {
        println!(
            "{} {} already exists",
            "•".yellow(),
            storage.path().display()
        );
        return Ok(());
    }

    storage
        .save(&AppConfig::default())
        .with_context(|| format!("Failed to write {}", storage.path().display()))?;
    println!("{} Wrote {}", "✓".green(), storage.path().display());
    Ok(())
}
