//! Settings domain model.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::currency::Currency;

/// Display language of the storefront.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    /// Returns the other supported language.
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }

    /// Arabic is laid out right-to-left.
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }
}

/// Color theme of the storefront.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Returns the other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Process-wide user preferences.
///
/// Loaded once at startup; any value that is absent or malformed in the
/// store falls back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub language: Language,
    pub theme: Theme,
    /// Only some deployments offer a currency switch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

impl Settings {
    /// Creates settings with default values (English, light, no currency).
    pub fn new() -> Self {
        Self::default()
    }

    /// Currency used for price display, USD when none was chosen.
    pub fn effective_currency(&self) -> Currency {
        self.currency.unwrap_or_default()
    }
}
