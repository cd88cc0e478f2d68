//! Product domain model.

use serde::{Deserialize, Serialize};

use crate::settings::Language;

/// Unique numeric product identifier.
pub type ProductId = u64;

/// Immutable catalog entry.
///
/// Products are created by the catalog provider and never mutated by the
/// client. The JSON shape uses camelCase keys (`nameAr`, `inStock`) so that
/// cached payloads stay compatible with the remote catalog. Every field other
/// than `id`, `name` and `price` is optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
    /// Price in the base currency unit.
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub category_ar: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

fn default_in_stock() -> bool {
    true
}

impl Product {
    /// Creates an in-stock product with only the required fields set.
    pub fn new(id: ProductId, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            name_ar: String::new(),
            price,
            category: String::new(),
            category_ar: String::new(),
            image: String::new(),
            description: String::new(),
            description_ar: String::new(),
            rating: 0.0,
            in_stock: true,
            brand: String::new(),
            slug: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Prices must be finite and non-negative.
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price >= 0.0
    }

    /// Name in the requested language, English when no translation exists.
    pub fn display_name(&self, language: Language) -> &str {
        localized(&self.name, &self.name_ar, language)
    }

    pub fn display_category(&self, language: Language) -> &str {
        localized(&self.category, &self.category_ar, language)
    }

    pub fn display_description(&self, language: Language) -> &str {
        localized(&self.description, &self.description_ar, language)
    }

    /// Path segment used in share links: the slug, or the numeric id.
    pub fn share_key(&self) -> String {
        match self.slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => self.id.to_string(),
        }
    }
}

fn localized<'a>(en: &'a str, ar: &'a str, language: Language) -> &'a str {
    match language {
        Language::Ar if !ar.trim().is_empty() => ar,
        _ => en,
    }
}
