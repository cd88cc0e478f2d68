//! Storefront service.
//!
//! Coordinates the catalog (cache, provider, defaults), the cart, settings
//! and checkout for one process.

use std::sync::Arc;

use ascend_core::cart::{Cart, CartLine};
use ascend_core::catalog::{CatalogFilter, CatalogProvider, Product, ProductId, default_products};
use ascend_core::checkout::{OrderSummary, whatsapp_link};
use ascend_core::config::AscendConfig;
use ascend_core::error::{AscendError, Result};
use ascend_infrastructure::{CatalogCache, SettingsService};
use tokio::sync::{Mutex, RwLock};

use crate::share::{ShareGuard, ShareTicket};

/// Where the current catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Cache,
    Defaults,
}

/// Outcome of [`Storefront::refresh_catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub source: CatalogSource,
    pub product_count: usize,
}

/// Storefront settings taken from `config.toml`.
#[derive(Debug, Clone)]
pub struct StorefrontOptions {
    pub checkout_phone: String,
    pub yer_rate: f64,
    pub origin: String,
}

impl From<&AscendConfig> for StorefrontOptions {
    fn from(config: &AscendConfig) -> Self {
        Self {
            checkout_phone: config.checkout.phone.clone(),
            yer_rate: config.currency.yer_rate,
            origin: config.store.origin.clone(),
        }
    }
}

impl Default for StorefrontOptions {
    fn default() -> Self {
        Self::from(&AscendConfig::default())
    }
}

/// The storefront's application state.
///
/// The cart sits behind a mutex so every mutation is serialized; the
/// catalog is replaced wholesale on refresh.
pub struct Storefront {
    cache: CatalogCache,
    settings: SettingsService,
    provider: Option<Arc<dyn CatalogProvider>>,
    options: StorefrontOptions,
    catalog: RwLock<(CatalogSource, Vec<Product>)>,
    cart: Mutex<Cart>,
    share_guard: ShareGuard,
}

impl Storefront {
    /// Loads settings and the catalog.
    ///
    /// A non-empty cached catalog is used as is; otherwise the built-in
    /// defaults are installed and written to the cache.
    pub async fn bootstrap(
        cache: CatalogCache,
        provider: Option<Arc<dyn CatalogProvider>>,
        options: StorefrontOptions,
    ) -> Self {
        let settings = SettingsService::load(cache.clone()).await;

        let cached = cache.load().await;
        let catalog = if cached.is_empty() {
            let defaults = default_products();
            cache.save(&defaults).await;
            tracing::info!(
                "[Storefront] No cached catalog, using {} default product(s)",
                defaults.len()
            );
            (CatalogSource::Defaults, defaults)
        } else {
            tracing::info!(
                "[Storefront] Loaded {} product(s) from cache",
                cached.len()
            );
            (CatalogSource::Cache, cached)
        };

        Self {
            cache,
            settings,
            provider,
            options,
            catalog: RwLock::new(catalog),
            cart: Mutex::new(Cart::new()),
            share_guard: ShareGuard::new(),
        }
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    pub fn options(&self) -> &StorefrontOptions {
        &self.options
    }

    /// Fetches the remote catalog.
    ///
    /// A non-empty result replaces the catalog and is cached. Errors and
    /// empty results keep the current catalog, so it is never left empty.
    pub async fn refresh_catalog(&self) -> RefreshOutcome {
        let fetched = match &self.provider {
            Some(provider) => provider.fetch_products().await,
            None => Err(AscendError::config("no catalog provider configured")),
        };

        match fetched {
            Ok(products) if !products.is_empty() => {
                self.cache.save(&products).await;
                let product_count = products.len();
                *self.catalog.write().await = (CatalogSource::Remote, products);
                tracing::info!("[Storefront] Catalog refreshed: {} product(s)", product_count);
                RefreshOutcome {
                    source: CatalogSource::Remote,
                    product_count,
                }
            }
            Ok(_) => {
                tracing::warn!("[Storefront] Provider returned no products, keeping current catalog");
                self.current_outcome().await
            }
            Err(e) => {
                tracing::warn!("[Storefront] Catalog refresh failed, keeping current catalog: {}", e);
                self.current_outcome().await
            }
        }
    }

    async fn current_outcome(&self) -> RefreshOutcome {
        let catalog = self.catalog.read().await;
        RefreshOutcome {
            source: catalog.0,
            product_count: catalog.1.len(),
        }
    }

    pub async fn catalog_source(&self) -> CatalogSource {
        self.catalog.read().await.0
    }

    pub async fn products(&self) -> Vec<Product> {
        self.catalog.read().await.1.clone()
    }

    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.catalog
            .read()
            .await
            .1
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub async fn filtered(&self, filter: &CatalogFilter) -> Vec<Product> {
        filter.apply(&self.catalog.read().await.1)
    }

    /// Adds one unit of a catalog product.
    pub async fn add_to_cart(&self, id: ProductId) -> Result<Vec<CartLine>> {
        let product = self
            .product(id)
            .await
            .ok_or_else(|| AscendError::not_found("Product", id.to_string()))?;
        let mut cart = self.cart.lock().await;
        Ok(cart.add_to_cart(&product).to_vec())
    }

    pub async fn update_quantity(&self, id: ProductId, delta: i64) -> Vec<CartLine> {
        let mut cart = self.cart.lock().await;
        cart.update_quantity(id, delta);
        cart.lines().to_vec()
    }

    pub async fn remove_item(&self, id: ProductId) -> Vec<CartLine> {
        let mut cart = self.cart.lock().await;
        cart.remove_item(id);
        cart.lines().to_vec()
    }

    pub async fn cart(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    pub async fn order_summary(&self) -> OrderSummary {
        let settings = self.settings.current().await;
        let cart = self.cart.lock().await;
        OrderSummary::from_cart(
            cart.lines(),
            settings.language,
            settings.effective_currency(),
            self.options.yer_rate,
        )
    }

    /// Deep link handing the order to the store's messaging number.
    ///
    /// `None` for an empty cart or when no number is configured.
    pub async fn checkout_link(&self) -> Option<String> {
        let summary = self.order_summary().await;
        let link = whatsapp_link(&self.options.checkout_phone, &summary);
        if link.is_none() && !summary.is_empty() {
            tracing::warn!("[Storefront] Checkout phone is not configured");
        }
        link
    }

    /// Starts sharing a product; `None` while another share is in progress.
    pub fn share(&self, product: &Product) -> Option<ShareTicket> {
        self.share_guard.begin(&self.options.origin, product)
    }
}
