//! Marketplace fee resolution and supplier-level fee inputs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flat per-category fee table, keyed marketplace -> category -> fee.
/// The shape of `marketplace_fees.json`.
pub type FeeTable = HashMap<String, HashMap<String, f64>>;

/// Look up a flat marketplace fee, falling back to the marketplace's
/// "default" entry when the category is unknown.
///
/// Keys are normalized: trimmed and lowercased. A missing marketplace (or a
/// marketplace with neither the category nor a default) resolves to 0 — an
/// unknown channel is not an error, it just carries no fee.
pub fn marketplace_fee_lookup(marketplace: &str, category: &str, fee_table: &FeeTable) -> f64 {
    let m = marketplace.trim().to_lowercase();
    let c = category.trim().to_lowercase();
    if m.is_empty() {
        return 0.0;
    }
    let Some(table) = fee_table.get(&m) else {
        return 0.0;
    };
    if let Some(v) = table.get(&c) {
        return *v;
    }
    table.get("default").copied().unwrap_or(0.0)
}

/// Per-marketplace fee model for the feed pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeRule {
    /// fee = price * percent + per_item.
    PercentOfPrice {
        #[serde(default)]
        percent: f64,
        #[serde(default)]
        per_item: f64,
    },
    /// Flat fee by category with a "default" fallback.
    CategoryTable {
        #[serde(default)]
        categories: HashMap<String, f64>,
    },
}

impl Default for FeeRule {
    fn default() -> Self {
        FeeRule::PercentOfPrice {
            percent: 0.0,
            per_item: 0.0,
        }
    }
}

impl FeeRule {
    /// Fee for a provisional price. The percent model is evaluated against a
    /// price computed before the fee was known — a one-pass approximation,
    /// not a fixed-point solve.
    pub fn fee_for(&self, price: f64, category: &str) -> f64 {
        match self {
            FeeRule::PercentOfPrice { percent, per_item } => price * percent + per_item,
            FeeRule::CategoryTable { categories } => {
                let c = category.trim().to_lowercase();
                categories
                    .get(&c)
                    .or_else(|| categories.get("default"))
                    .copied()
                    .unwrap_or(0.0)
            }
        }
    }
}

/// Supplier-level fees added on top of item cost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierFees {
    #[serde(default)]
    pub dropship_fee: f64,
    #[serde(default)]
    pub handling_fee: f64,
    /// Ad-hoc extra fees, summed into the cost base.
    #[serde(default)]
    pub misc_fees: Vec<f64>,
}

impl SupplierFees {
    pub fn misc_total(&self) -> f64 {
        self.misc_fees.iter().sum()
    }
}
