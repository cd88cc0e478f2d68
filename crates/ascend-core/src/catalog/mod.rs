//! Product catalog: model, built-in defaults, filtering and the provider seam.

pub mod defaults;
pub mod filter;
pub mod model;
pub mod provider;

pub use defaults::default_products;
pub use filter::{CatalogFilter, SortBy};
pub use model::{Product, ProductId};
pub use provider::CatalogProvider;

/// Store key holding the cached product list.
pub const CATALOG_CACHE_KEY: &str = "ascend_cache";
