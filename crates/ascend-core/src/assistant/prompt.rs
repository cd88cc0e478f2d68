//! System instruction for the shopping assistant.
//!
//! The instruction embeds the whole catalog as a context block plus fixed
//! behavioural rules, and states the caller's location when known.

use minijinja::{Environment, context};
use serde::Serialize;

use super::error::AssistantError;
use super::model::GeoLocation;
use crate::catalog::Product;

const SYSTEM_INSTRUCTION_TEMPLATE: &str = r#"You are the ASCEND Assistant, an enthusiastic and helpful AI sales associate for a high-end online store named ASCEND.
Your goal is to help customers find the perfect products, answer questions about specifications, and gently encourage purchases.

Here is our current product catalog:
{% for p in products -%}
- {{ p.name }} (${{ p.price }}): {{ p.description }}. Category: {{ p.category }}. ID: {{ p.id }}
{% endfor %}
Contextual Intelligence:
- Current User Location: {% if location %}Latitude {{ location.latitude }}, Longitude {{ location.longitude }}{% else %}Unknown/Denied. Ask the user for their city if they inquire about "nearby" stores or trends.{% endif %}

Rules:
1. Always be polite, professional, and concise.
2. If a user asks for a recommendation, suggest products from the catalog above.
3. If a user asks about a specific product, provide details based on the catalog.
4. Use Google Search or Maps if the user asks for real-world info (trends, locations) not in your catalog.
5. If user location is 'Unknown' and they ask for "nearby" things, politely ask for their location first.
6. If you use Search or Maps, you must provide the sources.
"#;

#[derive(Serialize)]
struct CatalogEntry<'a> {
    id: u64,
    name: &'a str,
    price: String,
    description: &'a str,
    category: &'a str,
}

/// Renders the system instruction for `products` and an optional location.
pub fn build_system_instruction(
    products: &[Product],
    location: Option<GeoLocation>,
) -> Result<String, AssistantError> {
    let entries: Vec<CatalogEntry<'_>> = products
        .iter()
        .map(|p| CatalogEntry {
            id: p.id,
            name: &p.name,
            price: format!("{:.2}", p.price),
            description: p.description.trim_end_matches('.'),
            category: &p.category,
        })
        .collect();

    let env = Environment::new();
    env.render_str(
        SYSTEM_INSTRUCTION_TEMPLATE,
        context! {
            products => entries,
            location => location,
        },
    )
    .map_err(|e| AssistantError::Prompt(e.to_string()))
}

/// Prompt for a short marketing description of a product.
pub fn product_description_prompt(product_name: &str, category: &str) -> String {
    format!(
        "Write a compelling, short marketing description (max 2 sentences) for a product named \"{product_name}\" in the category \"{category}\". Make it sound premium and inspiring."
    )
}
