//! Catalog filtering and sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::model::Product;

/// Result ordering for a filtered catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortBy {
    /// Catalog order as delivered by the provider.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    Rating,
    Name,
}

/// Criteria applied to the product list.
///
/// Empty `categories` or `brands` match every product. The price range is
/// inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFilter {
    pub categories: Vec<String>,
    pub price_range: (f64, f64),
    pub brands: Vec<String>,
    pub min_rating: f64,
    pub in_stock_only: bool,
    pub sort_by: SortBy,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            price_range: (0.0, 1000.0),
            brands: Vec::new(),
            min_rating: 0.0,
            in_stock_only: false,
            sort_by: SortBy::Relevance,
        }
    }
}

impl CatalogFilter {
    /// A filter that accepts any price.
    pub fn unbounded() -> Self {
        Self {
            price_range: (0.0, f64::INFINITY),
            ..Self::default()
        }
    }

    /// Returns true if the product satisfies every criterion.
    pub fn matches(&self, product: &Product) -> bool {
        let (min_price, max_price) = self.price_range;

        (self.categories.is_empty() || self.categories.iter().any(|c| c == &product.category))
            && (self.brands.is_empty() || self.brands.iter().any(|b| b == &product.brand))
            && product.price >= min_price
            && product.price <= max_price
            && product.rating >= self.min_rating
            && (!self.in_stock_only || product.in_stock)
    }

    /// Filters and sorts a copy of `products`.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut result: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        match self.sort_by {
            SortBy::Relevance => {}
            SortBy::PriceAsc => result.sort_by(|a, b| cmp_f64(a.price, b.price)),
            SortBy::PriceDesc => result.sort_by(|a, b| cmp_f64(b.price, a.price)),
            SortBy::Rating => result.sort_by(|a, b| cmp_f64(b.rating, a.rating)),
            SortBy::Name => result.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        }

        result
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_products;

    fn ids(products: &[Product]) -> Vec<u64> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_default_filter_keeps_catalog_order() {
        let products = default_products();
        let result = CatalogFilter::default().apply(&products);
        assert_eq!(ids(&result), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_category_filter() {
        let filter = CatalogFilter {
            categories: vec!["Accessories".to_string()],
            ..CatalogFilter::default()
        };
        assert_eq!(ids(&filter.apply(&default_products())), vec![1, 2]);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let filter = CatalogFilter {
            price_range: (120.0, 390.0),
            ..CatalogFilter::default()
        };
        assert_eq!(ids(&filter.apply(&default_products())), vec![2, 3, 4]);
    }

    #[test]
    fn test_default_range_excludes_expensive_items() {
        let products = vec![Product::new(1, "cheap", 10.0), Product::new(2, "pricey", 1500.0)];
        assert_eq!(ids(&CatalogFilter::default().apply(&products)), vec![1]);
        assert_eq!(ids(&CatalogFilter::unbounded().apply(&products)), vec![1, 2]);
    }

    #[test]
    fn test_stock_brand_and_rating() {
        let products = vec![
            Product::new(1, "a", 10.0).with_brand("Sony").with_rating(4.5),
            Product::new(2, "b", 10.0).with_brand("Sony").with_rating(3.0),
            Product::new(3, "c", 10.0).with_brand("Sony").with_rating(5.0).with_stock(false),
            Product::new(4, "d", 10.0).with_brand("ASCEND").with_rating(5.0),
        ];
        let filter = CatalogFilter {
            brands: vec!["Sony".to_string()],
            min_rating: 4.0,
            in_stock_only: true,
            ..CatalogFilter::default()
        };
        assert_eq!(ids(&filter.apply(&products)), vec![1]);
    }

    #[test]
    fn test_sorting() {
        let products = default_products();
        let mut filter = CatalogFilter {
            sort_by: SortBy::PriceAsc,
            ..CatalogFilter::default()
        };
        assert_eq!(ids(&filter.apply(&products)), vec![4, 2, 3, 1]);

        filter.sort_by = SortBy::PriceDesc;
        assert_eq!(ids(&filter.apply(&products)), vec![1, 3, 2, 4]);

        filter.sort_by = SortBy::Rating;
        assert_eq!(ids(&filter.apply(&products)), vec![1, 2, 3, 4]);

        filter.sort_by = SortBy::Name;
        assert_eq!(ids(&filter.apply(&products)), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_sort_by_parses_kebab_case() {
        assert_eq!("price-asc".parse::<SortBy>().unwrap(), SortBy::PriceAsc);
        assert_eq!(SortBy::PriceDesc.to_string(), "price-desc");
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let filter: CatalogFilter =
            serde_json::from_str(r#"{"categories":["Apparel"],"sortBy":"price-asc"}"#).unwrap();
        assert_eq!(filter.price_range, (0.0, 1000.0));
        assert_eq!(filter.categories, vec!["Apparel".to_string()]);
        assert_eq!(filter.sort_by, SortBy::PriceAsc);
        assert!(!filter.in_stock_only);
    }
}
