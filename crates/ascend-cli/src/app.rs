//! Wires configuration, storage and services for one CLI run.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use ascend_application::{AssistantAdapter, Storefront, StorefrontOptions};
use ascend_core::catalog::CatalogProvider;
use ascend_core::config::AscendConfig;
use ascend_infrastructure::storage::{GEMINI_API_KEY_ENV, SecretStorage};
use ascend_infrastructure::{
    AscendPaths, CatalogCache, ConfigStorage, HttpCatalogProvider, IpGeolocationProvider,
    JsonFileStore,
};
use ascend_interaction::GeminiApiOracle;

pub struct AppContext {
    pub paths: AscendPaths,
    pub config: AscendConfig,
    pub storefront: Arc<Storefront>,
}

impl AppContext {
    pub async fn load(paths: AscendPaths) -> Result<Self> {
        let config_file = paths.config_file()?;
        let config = ConfigStorage::new(config_file.clone())
            .load()
            .with_context(|| format!("Failed to read {}", config_file.display()))?;

        let store = JsonFileStore::new(paths.store_file()?);
        let cache = CatalogCache::new(Arc::new(store));

        let provider: Option<Arc<dyn CatalogProvider>> =
            match HttpCatalogProvider::from_config(&config.catalog) {
                Ok(provider) => Some(Arc::new(provider)),
                Err(e) => {
                    tracing::warn!("[App] Catalog provider unavailable: {}", e);
                    None
                }
            };

        let storefront =
            Storefront::bootstrap(cache, provider, StorefrontOptions::from(&config)).await;

        Ok(Self {
            paths,
            config,
            storefront: Arc::new(storefront),
        })
    }

    /// Builds the assistant from secret.json and `GEMINI_API_KEY`.
    pub fn assistant(&self) -> Result<AssistantAdapter> {
        let secrets = SecretStorage::new(&self.paths)?;
        let gemini = secrets
            .gemini_config(std::env::var(GEMINI_API_KEY_ENV).ok())?
            .ok_or_else(|| {
                anyhow!(
                    "Gemini is not configured: set {} or add a \"gemini\" entry to {}",
                    GEMINI_API_KEY_ENV,
                    secrets.path().display()
                )
            })?;

        let oracle = GeminiApiOracle::from_config(&gemini, &self.config.assistant.model)?;
        let mut adapter = AssistantAdapter::new(Arc::new(oracle));

        let assistant_config = &self.config.assistant;
        if assistant_config.use_geolocation {
            let timeout = Duration::from_secs(assistant_config.geolocation_timeout_secs);
            let provider =
                IpGeolocationProvider::new(assistant_config.geolocation_endpoint.clone(), timeout)?;
            adapter = adapter.with_geolocation(Arc::new(provider), timeout);
        }

        #[cfg(feature = "voice")]
        {
            adapter = adapter.with_voice(ascend_application::VoiceBackend {
                transport: Arc::new(ascend_interaction::GeminiLiveTransport::from_config(&gemini)),
                capture: Arc::new(ascend_infrastructure::CpalCapture::new()),
                playback: Arc::new(ascend_infrastructure::RodioPlayback::new()),
                model: assistant_config.live_model.clone(),
                voice_name: assistant_config.voice_name.clone(),
            });
        }

        Ok(adapter)
    }
}
