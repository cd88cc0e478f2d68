//! Display currency and price formatting.
//!
//! Catalog prices are kept in a single base unit (US dollars). Other
//! currencies are derived at display time with a configured rate.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default number of Yemeni rials per US dollar.
pub const DEFAULT_YER_RATE: f64 = 530.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Currency {
    #[default]
    Usd,
    Yer,
}

/// Formats a base-unit amount for display.
///
/// USD keeps two decimals (`$1,040.00`); YER is converted with `yer_rate`
/// and shown as whole rials (`13,250 YER`).
pub fn format_price(amount: f64, currency: Currency, yer_rate: f64) -> String {
    match currency {
        Currency::Usd => {
            let cents = (amount * 100.0).round() as i64;
            let sign = if cents < 0 { "-" } else { "" };
            let cents = cents.abs();
            format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
        }
        Currency::Yer => {
            let rials = (amount * yer_rate).round() as i64;
            let sign = if rials < 0 { "-" } else { "" };
            format!("{sign}{} YER", group_thousands(rials.abs()))
        }
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
