//! Currency-string parsing and price rounding policies.
//!
//! Every numeric cell in a supplier feed goes through `parse_money` /
//! `parse_quantity`: a value that does not survive coercion becomes None and
//! the row carries a warning instead of failing the batch.

use serde::{Deserialize, Serialize};

/// Rounding policy applied to computed prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round to 2 decimal places (default).
    #[default]
    Cents,
    /// Charm pricing: round to the nearest x.99 at or above the price.
    #[serde(rename = ".99", alias = "ends_in_99")]
    EndsIn99,
    /// No rounding at all.
    None,
}

impl RoundingMode {
    /// Parse a CLI/config string. Accepts both spellings of charm pricing.
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cents" => Some(Self::Cents),
            ".99" | "ends_in_99" => Some(Self::EndsIn99),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Parse a currency-like string into a float.
///
/// Strips surrounding whitespace, `$` and thousands separators. Empty or
/// non-numeric input yields None, never an error.
pub fn parse_money(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Parse a quantity cell. Accepts "12" and "12.0" alike (truncating),
/// yields None for anything else.
pub fn parse_quantity(text: &str) -> Option<i64> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().map(|v| v as i64)
}

/// Apply a rounding policy to a price.
///
/// For `EndsIn99` the boundary rule is: with `whole = price.floor()`, a price
/// at or below `whole + 0.99` becomes `whole + 0.99`, otherwise the next
/// charm price `whole + 1.99`. The result always ends in .99 and is >= price.
pub fn round_price(price: f64, mode: RoundingMode) -> f64 {
    match mode {
        RoundingMode::Cents => round2(price),
        RoundingMode::EndsIn99 => {
            let whole = price.floor();
            if price <= whole + 0.99 {
                round2(whole + 0.99)
            } else {
                round2(whole + 1.99)
            }
        }
        RoundingMode::None => price,
    }
}

/// Round to 2 decimals. Used for authoritative prices in `Cents` mode and
/// for display-rounded cost components.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Round to 4 decimals. Diagnostic fields only (weights), never prices.
pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
