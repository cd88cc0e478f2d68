//! Checkout handoff: a readable order summary and a messaging deep link.

use std::fmt;

use crate::cart::CartLine;
use crate::settings::{Currency, Language, format_price};

const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Human-readable order summary built from cart lines.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    language: Language,
    lines: Vec<String>,
    total: String,
}

impl OrderSummary {
    /// Renders one row per line (`2 x Onyx Modular Pack - $490.00`) and a
    /// total. Names follow `language`; amounts follow `currency`.
    pub fn from_cart(
        lines: &[CartLine],
        language: Language,
        currency: Currency,
        yer_rate: f64,
    ) -> Self {
        let rows = lines
            .iter()
            .map(|line| {
                format!(
                    "{} x {} - {}",
                    line.quantity(),
                    line.product.display_name(language),
                    format_price(line.line_total(), currency, yer_rate)
                )
            })
            .collect();
        let subtotal: f64 = lines.iter().map(CartLine::line_total).sum();

        Self {
            language,
            lines: rows,
            total: format_price(subtotal, currency, yer_rate),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for OrderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (heading, total_label) = match self.language {
            Language::En => ("New order from ASCEND:", "Total"),
            Language::Ar => ("طلب جديد من ASCEND:", "الإجمالي"),
        };
        writeln!(f, "{heading}")?;
        for line in &self.lines {
            writeln!(f, "- {line}")?;
        }
        write!(f, "{total_label}: {}", self.total)
    }
}

/// Builds a WhatsApp deep link carrying the URL-encoded summary.
///
/// Returns `None` for an empty summary or a phone number without digits.
pub fn whatsapp_link(phone: &str, summary: &OrderSummary) -> Option<String> {
    if summary.is_empty() {
        return None;
    }
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let text = summary.to_string();
    Some(format!(
        "{WHATSAPP_BASE_URL}/{digits}?text={}",
        urlencoding::encode(&text)
    ))
}
