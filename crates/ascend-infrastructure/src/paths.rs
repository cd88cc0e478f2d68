//! Unified path management for ascend configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/ascend/            # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys
//! ├── store.json               # Key-value store (catalog cache, settings)
//! └── logs/                    # Application logs
//!     └── ascend.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

const APP_DIR: &str = "ascend";

/// Resolves every file location from one root.
///
/// `AscendPaths::new(None)` uses the platform config directory; tests pass
/// an explicit root.
#[derive(Debug, Clone)]
pub struct AscendPaths {
    root: Option<PathBuf>,
}

impl AscendPaths {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Returns the ascend configuration directory (e.g. `~/.config/ascend/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Ensure this file has restrictive permissions (e.g. 600).
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    pub fn store_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("store.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}

impl Default for AscendPaths {
    fn default() -> Self {
        Self::new(None)
    }
}
