//! Catalog cache over a key-value store.
//!
//! Persists the product list under [`CATALOG_CACHE_KEY`] and scalar settings
//! under their own keys. Reads never fail: anything missing or unparseable
//! is reported as absent. Writes are fire-and-forget and only log failures.

use std::sync::Arc;

use ascend_core::catalog::{CATALOG_CACHE_KEY, Product};
use ascend_core::store::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Cache for the catalog and settings.
///
/// # Example
///
/// ```ignore
/// let cache = CatalogCache::new(Arc::new(JsonFileStore::new(path)));
/// cache.save(&products).await;
/// let products = cache.load().await;
/// ```
#[derive(Clone)]
pub struct CatalogCache {
    store: Arc<dyn KeyValueStore>,
}

impl CatalogCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the last persisted product list, or an empty list.
    pub async fn load(&self) -> Vec<Product> {
        self.read_json::<Vec<Product>>(CATALOG_CACHE_KEY)
            .await
            .unwrap_or_default()
    }

    /// Overwrites the persisted product list.
    pub async fn save(&self, products: &[Product]) {
        self.write_json(CATALOG_CACHE_KEY, &products).await;
    }

    /// Returns the setting stored under `key`. Absent and malformed values
    /// both yield `None`.
    pub async fn get_setting<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read_json(key).await
    }

    /// Overwrites the setting stored under `key`.
    pub async fn set_setting<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        self.write_json(key, value).await;
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("[CatalogCache] Failed to read '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("[CatalogCache] Ignoring malformed value for '{}': {}", key, e);
                None
            }
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("[CatalogCache] Failed to serialize '{}': {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(key, raw).await {
            tracing::warn!("[CatalogCache] Failed to write '{}': {}", key, e);
        }
    }
}
