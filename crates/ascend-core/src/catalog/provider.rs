//! Catalog provider trait.

use async_trait::async_trait;

use crate::catalog::model::Product;
use crate::error::Result;

/// Remote source of the product list.
///
/// Implementations return an error on transport failure or a non-success
/// status; callers decide on the fallback (cache, then built-in defaults).
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Product>>;
}
