//! Built-in catalog used when neither the cache nor the provider has data.

use once_cell::sync::Lazy;

use super::model::Product;

static DEFAULT_PRODUCTS: Lazy<Vec<Product>> = Lazy::new(|| {
    vec![
        Product {
            id: 1,
            name: "Aether Chronograph V2".to_string(),
            name_ar: "ساعة إيثر النسخة الثانية".to_string(),
            price: 520.00,
            category: "Accessories".to_string(),
            category_ar: "إكسسوارات".to_string(),
            image: "https://images.unsplash.com/photo-1523275335684-37898b6baf30?auto=format&fit=crop&w=1200&q=80".to_string(),
            description: "Military-grade sapphire crystal meets surgical steel in our most precise chronograph yet.".to_string(),
            description_ar: "زجاج ياقوتي عسكري مع فولاذ جراحي في أدق ساعة كرونوغراف لدينا حتى الآن.".to_string(),
            rating: 4.9,
            in_stock: true,
            brand: "ASCEND".to_string(),
            slug: Some("aether-chrono-v2".to_string()),
        },
        Product {
            id: 2,
            name: "Onyx Modular Pack".to_string(),
            name_ar: "حقيبة أونيكس المعيارية".to_string(),
            price: 245.00,
            category: "Accessories".to_string(),
            category_ar: "إكسسوارات".to_string(),
            image: "https://images.unsplash.com/photo-1553062407-98eeb64c6a62?auto=format&fit=crop&w=1200&q=80".to_string(),
            description: "Ballistic nylon construction with climate-controlled tech sleeves for your most valuable gear.".to_string(),
            description_ar: "هيكل من النايلون الباليستي مع أكمام تقنية متحكم في مناخها لمعداتك الثمينة.".to_string(),
            rating: 4.8,
            in_stock: true,
            brand: "ASCEND".to_string(),
            slug: Some("onyx-modular-pack".to_string()),
        },
        Product {
            id: 3,
            name: "Nova Hi-Res Headphones".to_string(),
            name_ar: "سماعات نوفا عالية الدقة".to_string(),
            price: 390.00,
            category: "Electronics".to_string(),
            category_ar: "إلكترونيات".to_string(),
            image: "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?auto=format&fit=crop&w=1200&q=80".to_string(),
            description: "Lossless audio streaming with adaptive transparency and 50-hour battery cycle.".to_string(),
            description_ar: "بث صوتي بدون فقدان مع شفافية متكيفة ودورة بطارية تدوم 50 ساعة.".to_string(),
            rating: 4.7,
            in_stock: true,
            brand: "Sony".to_string(),
            slug: Some("nova-hires".to_string()),
        },
        Product {
            id: 4,
            name: "Prism Smart Lighting".to_string(),
            name_ar: "إضاءة بريزم الذكية".to_string(),
            price: 120.00,
            category: "Home".to_string(),
            category_ar: "منزل".to_string(),
            image: "https://images.unsplash.com/photo-1534073828943-f801091bb18c?auto=format&fit=crop&w=1200&q=80".to_string(),
            description: "Full spectrum smart lighting integrated with your ecosystem for perfect focus ambiance.".to_string(),
            description_ar: "إضاءة ذكية كاملة الطيف متكاملة مع نظامك للحصول على جو تركيز مثالي.".to_string(),
            rating: 4.6,
            in_stock: true,
            brand: "ASCEND".to_string(),
            slug: Some("prism-smart-light".to_string()),
        },
    ]
});

/// Returns a copy of the built-in product list.
pub fn default_products() -> Vec<Product> {
    DEFAULT_PRODUCTS.clone()
}
