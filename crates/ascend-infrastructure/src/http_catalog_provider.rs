//! HTTP catalog provider.
//!
//! `GET <endpoint>` returning a JSON array of products.

use std::time::Duration;

use ascend_core::catalog::{CatalogProvider, Product};
use ascend_core::config::CatalogConfig;
use ascend_core::error::{AscendError, Result};
use async_trait::async_trait;
use reqwest::Client;

#[derive(Clone)]
pub struct HttpCatalogProvider {
    client: Client,
    endpoint: String,
}

impl HttpCatalogProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AscendError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalogProvider {
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        tracing::debug!("[HttpCatalogProvider] GET {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| AscendError::network(format!("Catalog request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AscendError::http_status(
                status.as_u16(),
                format!("Catalog endpoint returned {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AscendError::network(format!("Failed to read catalog body: {e}")))?;

        parse_products(&body)
    }
}

/// Parses a product array, dropping entries with an invalid price.
fn parse_products(body: &str) -> Result<Vec<Product>> {
    let products: Vec<Product> = serde_json::from_str(body)?;
    let total = products.len();

    let valid: Vec<Product> = products
        .into_iter()
        .filter(Product::has_valid_price)
        .collect();

    if valid.len() != total {
        tracing::warn!(
            "[HttpCatalogProvider] Dropped {} product(s) with invalid prices",
            total - valid.len()
        );
    }

    Ok(valid)
}
