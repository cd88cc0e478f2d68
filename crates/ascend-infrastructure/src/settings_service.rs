//! Settings service.
//!
//! Loads [`Settings`] once from the catalog cache and writes each change
//! straight back.

use std::sync::Arc;

use ascend_core::settings::{CURRENCY_KEY, Currency, LANGUAGE_KEY, Language, Settings, THEME_KEY, Theme};
use tokio::sync::RwLock;

use crate::catalog_cache::CatalogCache;

/// Service for reading and toggling user preferences.
///
/// Holds the in-memory copy; the cache is only read by [`SettingsService::load`].
#[derive(Clone)]
pub struct SettingsService {
    cache: CatalogCache,
    current: Arc<RwLock<Settings>>,
}

impl SettingsService {
    /// Loads settings, defaulting each absent or malformed value.
    pub async fn load(cache: CatalogCache) -> Self {
        let language = cache
            .get_setting::<Language>(LANGUAGE_KEY)
            .await
            .unwrap_or_default();
        let theme = cache
            .get_setting::<Theme>(THEME_KEY)
            .await
            .unwrap_or_default();
        let currency = cache.get_setting::<Currency>(CURRENCY_KEY).await;

        let settings = Settings {
            language,
            theme,
            currency,
        };
        tracing::debug!("[SettingsService] Loaded settings: {:?}", settings);

        Self {
            cache,
            current: Arc::new(RwLock::new(settings)),
        }
    }

    pub async fn current(&self) -> Settings {
        *self.current.read().await
    }

    /// Switches between English and Arabic and persists the result.
    pub async fn toggle_language(&self) -> Language {
        let language = {
            let mut settings = self.current.write().await;
            settings.language = settings.language.toggled();
            settings.language
        };
        self.cache.set_setting(LANGUAGE_KEY, &language).await;
        language
    }

    /// Switches between light and dark and persists the result.
    pub async fn toggle_theme(&self) -> Theme {
        let theme = {
            let mut settings = self.current.write().await;
            settings.theme = settings.theme.toggled();
            settings.theme
        };
        self.cache.set_setting(THEME_KEY, &theme).await;
        theme
    }

    pub async fn set_language(&self, language: Language) {
        self.current.write().await.language = language;
        self.cache.set_setting(LANGUAGE_KEY, &language).await;
    }

    pub async fn set_theme(&self, theme: Theme) {
        self.current.write().await.theme = theme;
        self.cache.set_setting(THEME_KEY, &theme).await;
    }

    pub async fn set_currency(&self, currency: Currency) {
        self.current.write().await.currency = Some(currency);
        self.cache.set_setting(CURRENCY_KEY, &currency).await;
    }
}
