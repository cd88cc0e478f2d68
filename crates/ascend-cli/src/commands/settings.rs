use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use ascend_core::settings::{CURRENCY_KEY, Currency, LANGUAGE_KEY, Language, THEME_KEY, Theme};

use crate::app::AppContext;

pub async fn get(ctx: &AppContext, key: &str) -> Result<()> {
    let settings = ctx.storefront.settings().current().await;

    let value = match key {
        LANGUAGE_KEY => settings.language.to_string(),
        THEME_KEY => settings.theme.to_string(),
        CURRENCY_KEY => settings
            .currency
            .map(|c| c.to_string())
            .unwrap_or_else(|| "(unset)".to_string()),
        other => bail!("Unknown setting '{other}' (expected language, theme or currency)"),
    };

    println!("{value}");
    Ok(())
}

pub async fn set(ctx: &AppContext, key: &str, value: &str) -> Result<()> {
    let settings = ctx.storefront.settings();

    match key {
        LANGUAGE_KEY => settings.set_language(parse::<Language>(key, value)?).await,
        THEME_KEY => settings.set_theme(parse::<Theme>(key, value)?).await,
        CURRENCY_KEY => settings.set_currency(parse::<Currency>(key, value)?).await,
        other => bail!("Unknown setting '{other}' (expected language, theme or currency)"),
    }

    tracing::info!("[CLI] Setting {} = {}", key, value);
    Ok(())
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    T::from_str(value).map_err(|_| anyhow!("Invalid value '{value}' for {key}"))
}
