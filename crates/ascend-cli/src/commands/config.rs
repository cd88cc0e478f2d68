use std::path::Path;

use anyhow::{Context, Result};
use ascend_core::config::AscendConfig;
use ascend_infrastructure::ConfigStorage;
use colored::Colorize;

/// Writes a default `config.toml`, leaving an existing file alone unless
/// `force` is set. Returns whether the file was written.
pub fn init(config_file: &Path, force: bool) -> Result<bool> {
    if config_file.exists() && !force {
        println!(
            "{} {}",
            "Config already exists:".yellow(),
            config_file.display()
        );
        println!("{}", "Pass --force to reset it to the defaults.".bright_black());
        return Ok(false);
    }

    ConfigStorage::new(config_file.to_path_buf())
        .save(&AscendConfig::default())
        .with_context(|| format!("Failed to write {}", config_file.display()))?;

    tracing::info!("[CLI] Wrote default config to {}", config_file.display());
    println!("{} {}", "Wrote".green(), config_file.display());
    Ok(true)
}
