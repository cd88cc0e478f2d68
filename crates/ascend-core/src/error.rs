//! Error types for the Ascend storefront core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the storefront crates.
///
/// Typed, structured variants with automatic conversion from the common
/// error types via `From`. Assistant-specific failures live in
/// [`crate::assistant::AssistantError`].
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AscendError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (key-value store layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote catalog or geolocation request failed
    #[error("Network error: {message}")]
    Network {
        status_code: Option<u16>,
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AscendError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Network error without an HTTP status
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            status_code: None,
            message: message.into(),
        }
    }

    /// Creates a Network error for a non-success HTTP status
    pub fn http_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::Network {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AscendError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AscendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AscendError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AscendError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for AscendError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<String> for AscendError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, AscendError>`.
pub type Result<T> = std::result::Result<T, AscendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_converts_to_serialization() {
        let err: AscendError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(err.is_serialization());
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_http_status_is_network() {
        let err = AscendError::http_status(503, "catalog unavailable");
        assert!(err.is_network());
        match err {
            AscendError::Network { status_code, .. } => assert_eq!(status_code, Some(503)),
            _ => panic!("Expected Network error"),
        }
    }
}
