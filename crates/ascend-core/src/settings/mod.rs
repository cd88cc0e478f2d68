//! User preferences persisted across sessions.

pub mod currency;
pub mod model;

pub use currency::{Currency, DEFAULT_YER_RATE, format_price};
pub use model::{Language, Settings, Theme};

/// Store key holding the selected [`Language`].
pub const LANGUAGE_KEY: &str = "language";
/// Store key holding the selected [`Theme`].
pub const THEME_KEY: &str = "theme";
/// Store key holding the selected [`Currency`].
pub const CURRENCY_KEY: &str = "currency";
