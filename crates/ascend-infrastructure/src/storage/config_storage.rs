//! config.toml storage.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::PathBuf;

use ascend_core::config::AscendConfig;

/// Errors that can occur during config storage operations.
#[derive(Debug)]
pub enum ConfigStorageError {
    /// File I/O error.
    IoError(std::io::Error),
    /// TOML parsing error.
    TomlParseError(toml::de::Error),
    /// TOML serialization error.
    TomlSerError(toml::ser::Error),
}

impl std::fmt::Display for ConfigStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigStorageError::TomlParseError(e) => write!(f, "TOML parse error: {}", e),
            ConfigStorageError::TomlSerError(e) => write!(f, "TOML serialization error: {}", e),
        }
    }
}

impl std::error::Error for ConfigStorageError {}

impl From<std::io::Error> for ConfigStorageError {
    fn from(e: std::io::Error) -> Self {
        ConfigStorageError::IoError(e)
    }
}

impl From<toml::de::Error> for ConfigStorageError {
    fn from(e: toml::de::Error) -> Self {
        ConfigStorageError::TomlParseError(e)
    }
}

impl From<toml::ser::Error> for ConfigStorageError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigStorageError::TomlSerError(e)
    }
}

/// Reads and writes `config.toml`.
///
/// Does NOT:
/// - Create the file on load (a missing file means defaults)
/// - Hold secrets (see [`super::SecretStorage`])
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the config. A missing or empty file yields the defaults.
    pub fn load(&self) -> Result<AscendConfig, ConfigStorageError> {
        if !self.path.exists() {
            return Ok(AscendConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(AscendConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }

    /// Writes the config atomically (tmp file + rename).
    pub fn save(&self, config: &AscendConfig) -> Result<(), ConfigStorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(config)?;

        let tmp_path = self.path.with_extension("toml.tmp");
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
