use anyhow::Result;
use ascend_application::CatalogSource;
use ascend_core::catalog::{CatalogFilter, SortBy};
use ascend_core::settings::format_price;
use colored::Colorize;

use crate::app::AppContext;

pub struct CatalogArgs {
    pub categories: Vec<String>,
    pub sort: SortBy,
    pub max_price: Option<f64>,
    pub in_stock: bool,
    pub refresh: bool,
}

pub async fn run(ctx: &AppContext, args: CatalogArgs) -> Result<()> {
    let storefront = &ctx.storefront;

    if args.refresh {
        let outcome = storefront.refresh_catalog().await;
        if outcome.source != CatalogSource::Remote {
            println!(
                "{}",
                "Could not reach the catalog service, showing the last known catalog.".yellow()
            );
        }
    }

    let mut filter = CatalogFilter::unbounded();
    filter.categories = args.categories;
    filter.sort_by = args.sort;
    filter.in_stock_only = args.in_stock;
    if let Some(max) = args.max_price {
        filter.price_range = (0.0, max);
    }

    let settings = storefront.settings().current().await;
    let currency = settings.effective_currency();
    let products = storefront.filtered(&filter).await;

    if products.is_empty() {
        println!("{}", "No products match.".bright_black());
        return Ok(());
    }

    for product in products {
        let stock = if product.in_stock {
            String::new()
        } else {
            " (out of stock)".red().to_string()
        };
        println!(
            "{:>4}  {}  {}  {}{}",
            product.id.to_string().bright_black(),
            product.display_name(settings.language).bold(),
            product.display_category(settings.language).cyan(),
            format_price(product.price, currency, storefront.options().yer_rate).green(),
            stock
        );
    }

    Ok(())
}
