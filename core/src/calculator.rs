//! The pricing calculator — a pure, state-free computation.
//!
//! Given cost inputs and an engine config it derives min/max/sell price,
//! applies rounding and MAP/MSRP clamps, and computes ROI. No I/O, no
//! caching; every call returns a fresh result.
//!
//! Two legacy formula families survive as explicit modes rather than one of
//! them silently winning:
//!
//!   MarkupOnCost (canonical):  price = total_cost * (1 + margin)
//!   MarginOnPrice:             price = base_cost / (1 - margin) + fee
//!
//! The same nominal margin produces materially different sell prices under
//! the two modes; callers must pick one in config.

use crate::fees::{marketplace_fee_lookup, FeeTable, SupplierFees};
use crate::money::{round2, round4, round_price, RoundingMode};
use crate::shipping::{shipping_from_rate_table, ProductDims, RateBand, DEFAULT_DIM_DIVISOR};
use serde::{Deserialize, Serialize};

/// Which margin formula family prices are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Margin is a markup on total cost.
    #[default]
    MarkupOnCost,
    /// Margin is a share of the sell price; fee added in one extra pass.
    MarginOnPrice,
}

/// Which of the two computed bounds becomes the sell price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellPriceMode {
    #[default]
    Min,
    Max,
    /// Arithmetic mean of min and max.
    Mid,
}

/// Pricing configuration, supplied per invocation and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_min_margin")]
    pub min_margin: f64,
    #[serde(default = "default_max_margin")]
    pub max_margin: f64,
    #[serde(default = "default_dim_divisor")]
    pub dim_divisor: f64,
    #[serde(default)]
    pub rounding_mode: RoundingMode,
    #[serde(default)]
    pub sell_price_mode: SellPriceMode,
    #[serde(default)]
    pub pricing_mode: PricingMode,
    #[serde(default)]
    pub shipping_rate_table: Vec<RateBand>,
    #[serde(default)]
    pub marketplace_fee_table: FeeTable,
}

fn default_min_margin() -> f64 {
    0.15
}
fn default_max_margin() -> f64 {
    0.35
}
fn default_dim_divisor() -> f64 {
    DEFAULT_DIM_DIVISOR
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_margin: default_min_margin(),
            max_margin: default_max_margin(),
            dim_divisor: default_dim_divisor(),
            rounding_mode: RoundingMode::Cents,
            sell_price_mode: SellPriceMode::Min,
            pricing_mode: PricingMode::MarkupOnCost,
            shipping_rate_table: Vec::new(),
            marketplace_fee_table: FeeTable::new(),
        }
    }
}

impl EngineConfig {
    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let mut fee_table = FeeTable::new();
        fee_table.insert("amazon".into(), [("default".to_string(), 2.5)].into());
        Self {
            shipping_rate_table: vec![RateBand {
                max_wt: 3.0,
                cost: 5.0,
            }],
            marketplace_fee_table: fee_table,
            ..Self::default()
        }
    }
}

/// Everything the calculator needs to know about one item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostInputs {
    #[serde(default)]
    pub item_cost: f64,
    #[serde(default = "default_marketplace")]
    pub marketplace: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub dims: ProductDims,
    #[serde(default)]
    pub supplier_fees: SupplierFees,
    /// Minimum Advertised Price; a positive value caps computed prices.
    #[serde(default)]
    pub map_price: Option<f64>,
    #[serde(default)]
    pub msrp: Option<f64>,
}

fn default_marketplace() -> String {
    "amazon".to_string()
}
fn default_category() -> String {
    "default".to_string()
}

impl Default for CostInputs {
    fn default() -> Self {
        Self {
            item_cost: 0.0,
            marketplace: default_marketplace(),
            category: default_category(),
            dims: ProductDims::default(),
            supplier_fees: SupplierFees::default(),
            map_price: None,
            msrp: None,
        }
    }
}

/// Echo of the inputs, with derived weights, for audit/debug output.
#[derive(Debug, Clone, Serialize)]
pub struct DimsEcho {
    pub length_in: f64,
    pub width_in: f64,
    pub height_in: f64,
    pub weight_lb: f64,
    pub dim_weight_lb: f64,
    pub billable_weight_lb: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeesEcho {
    pub dropship_fee: f64,
    pub handling_fee: f64,
    pub misc_fees: Vec<f64>,
    pub misc_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputsEcho {
    pub item_cost: f64,
    pub marketplace: String,
    pub category: String,
    pub dims: DimsEcho,
    pub supplier_fees: FeesEcho,
}

#[derive(Debug, Clone, Serialize)]
pub struct Components {
    pub calculated_shipping: f64,
    pub marketplace_fee: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Costs {
    /// Cost base excluding the marketplace fee; ROI denominator.
    pub roi_cost: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prices {
    pub min_price: f64,
    pub max_price: f64,
    pub sell_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Roi {
    pub roi_percent: f64,
}

/// The full pricing outcome. Immutable once returned, never cached.
#[derive(Debug, Clone, Serialize)]
pub struct PricingResult {
    pub inputs: InputsEcho,
    pub components: Components,
    pub costs: Costs,
    pub prices: Prices,
    pub roi: Roi,
    pub warnings: Vec<String>,
}

/// Margin-on-price solve: price such that (price - cost) / price = margin.
/// Margins at or above 0.999 would divide by ~zero and solve to 0.
pub(crate) fn solve_margin_price(base_cost: f64, margin: f64) -> f64 {
    if margin >= 0.999 {
        return 0.0;
    }
    base_cost / (1.0 - margin)
}

/// Ceiling clamp: a computed price above a positive MAP/MSRP is pulled down
/// to it, with a warning naming the clamp.
pub(crate) fn clamp_ceiling(
    price: &mut f64,
    cap: Option<f64>,
    label: &str,
    which: &str,
    warnings: &mut Vec<String>,
) {
    if let Some(cap) = cap.filter(|c| *c > 0.0) {
        if *price > cap {
            warnings.push(format!("{label} clamp applied to {which}"));
            *price = cap;
        }
    }
}

/// Compute the pricing result for one item.
///
/// MarkupOnCost:
///   roi_cost   = item_cost + dropship + handling + shipping + misc
///   total_cost = roi_cost + marketplace_fee        (looked up once)
///   min/max    = total_cost * (1 + margin)
///
/// MarginOnPrice:
///   min/max    = roi_cost / (1 - margin) + marketplace_fee  (one-pass fee)
///
/// Then: sell price selection, MAP/MSRP ceiling clamps, rounding, the
/// max >= min invariant repair, and ROI (whose cost base always excludes the
/// marketplace fee).
pub fn compute_pricing(payload: &CostInputs, config: &EngineConfig) -> PricingResult {
    let dims = payload.dims;
    let fees = &payload.supplier_fees;

    let dim_wt = dims.dim_weight_lb(config.dim_divisor);
    let billable_wt = dims.billable_weight_lb(config.dim_divisor);
    let calculated_shipping = shipping_from_rate_table(billable_wt, &config.shipping_rate_table);
    let marketplace_fee = marketplace_fee_lookup(
        &payload.marketplace,
        &payload.category,
        &config.marketplace_fee_table,
    );

    let roi_cost = payload.item_cost
        + fees.dropship_fee
        + fees.handling_fee
        + calculated_shipping
        + fees.misc_total();
    let total_cost = roi_cost + marketplace_fee;

    let (mut min_price, mut max_price) = match config.pricing_mode {
        PricingMode::MarkupOnCost => (
            total_cost * (1.0 + config.min_margin),
            total_cost * (1.0 + config.max_margin),
        ),
        PricingMode::MarginOnPrice => (
            solve_margin_price(roi_cost, config.min_margin) + marketplace_fee,
            solve_margin_price(roi_cost, config.max_margin) + marketplace_fee,
        ),
    };

    let mut warnings = Vec::new();
    clamp_ceiling(&mut min_price, payload.map_price, "MAP", "min_price", &mut warnings);
    clamp_ceiling(&mut max_price, payload.map_price, "MAP", "max_price", &mut warnings);
    clamp_ceiling(&mut min_price, payload.msrp, "MSRP", "min_price", &mut warnings);
    clamp_ceiling(&mut max_price, payload.msrp, "MSRP", "max_price", &mut warnings);

    let sell_price = match config.sell_price_mode {
        SellPriceMode::Min => min_price,
        SellPriceMode::Max => max_price,
        SellPriceMode::Mid => (min_price + max_price) / 2.0,
    };

    let min_price = round_price(min_price, config.rounding_mode);
    let mut max_price = round_price(max_price, config.rounding_mode);
    let sell_price = round_price(sell_price, config.rounding_mode);

    // Hard invariant of the output: max_price >= min_price.
    if max_price < min_price {
        warnings.push("max_price < min_price (adjusted)".to_string());
        max_price = min_price;
    }

    let roi = if roi_cost > 0.0 {
        (sell_price - roi_cost) / roi_cost
    } else {
        0.0
    };

    PricingResult {
        inputs: InputsEcho {
            item_cost: payload.item_cost,
            marketplace: payload.marketplace.clone(),
            category: payload.category.clone(),
            dims: DimsEcho {
                length_in: dims.length_in,
                width_in: dims.width_in,
                height_in: dims.height_in,
                weight_lb: dims.weight_lb,
                dim_weight_lb: round4(dim_wt),
                billable_weight_lb: round4(billable_wt),
            },
            supplier_fees: FeesEcho {
                dropship_fee: fees.dropship_fee,
                handling_fee: fees.handling_fee,
                misc_fees: fees.misc_fees.clone(),
                misc_total: fees.misc_total(),
            },
        },
        components: Components {
            calculated_shipping: round2(calculated_shipping),
            marketplace_fee: round2(marketplace_fee),
        },
        costs: Costs {
            roi_cost: round2(roi_cost),
            total_cost: round2(total_cost),
        },
        prices: Prices {
            min_price,
            max_price,
            sell_price,
        },
        roi: Roi {
            roi_percent: round2(roi * 100.0),
        },
        warnings,
    }
}

// ── Channel preview ────────────────────────────────────────────────
// Display-only quick preview for the dashboard: margin-on-price with a
// fixed additive margin offset per channel instead of a fee-table lookup.
// Never the authoritative pricer.

/// Additive margin offsets per channel for the quick preview.
pub const CHANNEL_MARGIN_OFFSETS: [(&str, f64); 3] =
    [("amazon", 0.0), ("shopify", 0.03), ("walmart", 0.01)];

/// Margin-on-price with the margin clamped to [0, 0.95].
pub fn price_from_margin(cost: f64, margin: f64) -> f64 {
    let m = margin.clamp(0.0, 0.95);
    if m <= 0.0 {
        return round2(cost);
    }
    round2(cost / (1.0 - m))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPreview {
    pub marketplace: String,
    pub margin_used: f64,
    pub price: f64,
}

/// Quick per-channel preview prices from a base margin.
pub fn channel_preview_prices(cost: f64, base_margin: f64) -> Vec<ChannelPreview> {
    CHANNEL_MARGIN_OFFSETS
        .iter()
        .map(|(channel, offset)| ChannelPreview {
            marketplace: (*channel).to_string(),
            margin_used: base_margin + offset,
            price: price_from_margin(cost, base_margin + offset),
        })
        .collect()
}
