//! Secret configuration file storage.
//!
//! Provides loading of secret configuration from ~/.config/ascend/secret.json.

use std::fs;
use std::path::PathBuf;

use ascend_core::config::{GeminiConfig, SecretConfig};

use crate::paths::AscendPaths;

/// Environment variable that overrides the Gemini API key in secret.json.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Secret file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine config directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

/// Read-only storage for secret.json.
///
/// # Security Note
///
/// The file is plaintext JSON and should have restrictive permissions
/// (e.g. 600). Keys are never logged.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a SecretStorage at the default location.
    pub fn new(paths: &AscendPaths) -> Result<Self, SecretStorageError> {
        let path = paths
            .secret_file()
            .map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a SecretStorage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads and parses secret.json.
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Resolves the Gemini configuration.
    ///
    /// `env_api_key` (normally the value of [`GEMINI_API_KEY_ENV`]) wins over
    /// the file; a missing file is only an error when no override is given.
    pub fn gemini_config(
        &self,
        env_api_key: Option<String>,
    ) -> Result<Option<GeminiConfig>, SecretStorageError> {
        let from_file = match self.load() {
            Ok(config) => config.gemini,
            Err(SecretStorageError::NotFound(_)) if env_api_key.is_some() => None,
            Err(e) => return Err(e),
        };

        match env_api_key.filter(|key| !key.trim().is_empty()) {
            Some(api_key) => Ok(Some(GeminiConfig {
                api_key,
                model_name: from_file.and_then(|c| c.model_name),
            })),
            None => Ok(from_file),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
