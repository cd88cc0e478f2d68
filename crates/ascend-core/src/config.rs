//! Configuration models.
//!
//! `AscendConfig` is read from `config.toml`; `SecretConfig` from
//! `secret.json`. Every config field has a default so a missing or partial
//! file still yields a usable configuration.

use serde::{Deserialize, Serialize};

use crate::settings::DEFAULT_YER_RATE;

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AscendConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Endpoint returning a JSON array of products.
    #[serde(default = "default_catalog_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: default_catalog_endpoint(),
            timeout_secs: default_catalog_timeout(),
        }
    }
}

fn default_catalog_endpoint() -> String {
    "https://ascend-web-site.onrender.com/products".to_string()
}

fn default_catalog_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_live_model")]
    pub live_model: String,
    #[serde(default = "default_voice_name")]
    pub voice_name: String,
    /// Bias the maps tool with the caller's approximate location.
    #[serde(default = "default_true")]
    pub use_geolocation: bool,
    #[serde(default = "default_geolocation_endpoint")]
    pub geolocation_endpoint: String,
    #[serde(default = "default_geolocation_timeout")]
    pub geolocation_timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            live_model: default_live_model(),
            voice_name: default_voice_name(),
            use_geolocation: true,
            geolocation_endpoint: default_geolocation_endpoint(),
            geolocation_timeout_secs: default_geolocation_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_live_model() -> String {
    "gemini-2.5-flash-native-audio-preview-12-2025".to_string()
}

fn default_voice_name() -> String {
    "Zephyr".to_string()
}

fn default_geolocation_endpoint() -> String {
    "https://ipapi.co/json/".to_string()
}

fn default_geolocation_timeout() -> u64 {
    8
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Messaging number receiving orders, international format.
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_yer_rate")]
    pub yer_rate: f64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            yer_rate: default_yer_rate(),
        }
    }
}

fn default_yer_rate() -> f64 {
    DEFAULT_YER_RATE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Public origin used to build share links.
    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
        }
    }
}

fn default_origin() -> String {
    "https://ascend.store".to_string()
}

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AscendConfig = toml::from_str("").unwrap();
        assert_eq!(config, AscendConfig::default());
        assert_eq!(config.assistant.voice_name, "Zephyr");
        assert_eq!(config.currency.yer_rate, DEFAULT_YER_RATE);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AscendConfig = toml::from_str(
            r#"
            [assistant]
            use_geolocation = false

            [checkout]
            phone = "+967 777 000 111"
            "#,
        )
        .unwrap();

        assert!(!config.assistant.use_geolocation);
        assert_eq!(config.assistant.model, "gemini-2.5-flash");
        assert_eq!(config.checkout.phone, "+967 777 000 111");
        assert_eq!(config.catalog.timeout_secs, 10);
    }
}
