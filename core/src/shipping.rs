//! Dimensional-weight model and shipping-cost lookup.

use serde::{Deserialize, Serialize};

/// Divisor applied to L*W*H when the configured one is unusable.
pub const DEFAULT_DIM_DIVISOR: f64 = 139.0;

/// Physical dimensions of one unit, inches and pounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDims {
    #[serde(default)]
    pub length_in: f64,
    #[serde(default)]
    pub width_in: f64,
    #[serde(default)]
    pub height_in: f64,
    #[serde(default)]
    pub weight_lb: f64,
}

impl ProductDims {
    /// Volumetric weight: (L*W*H)/divisor, dimensions clamped to >= 0.
    /// A divisor <= 0 falls back to the standard 139.
    pub fn dim_weight_lb(&self, dim_divisor: f64) -> f64 {
        let l = self.length_in.max(0.0);
        let w = self.width_in.max(0.0);
        let h = self.height_in.max(0.0);
        let divisor = if dim_divisor <= 0.0 {
            DEFAULT_DIM_DIVISOR
        } else {
            dim_divisor
        };
        (l * w * h) / divisor
    }

    /// Carrier-billable weight: the greater of actual and dimensional weight.
    /// Never below the actual weight.
    pub fn billable_weight_lb(&self, dim_divisor: f64) -> f64 {
        self.weight_lb.max(0.0).max(self.dim_weight_lb(dim_divisor))
    }
}

/// One band of a tiered shipping rate table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub max_wt: f64,
    pub cost: f64,
}

/// Tiered, inclusive-upper-bound rate lookup.
///
/// Bands are sorted ascending by `max_wt`; the first band whose `max_wt` is
/// >= the weight wins, so a tie at the boundary resolves to the cheaper band.
/// A weight heavier than every band gets the heaviest band's cost. An empty
/// table costs 0.
pub fn shipping_from_rate_table(billable_weight_lb: f64, rate_table: &[RateBand]) -> f64 {
    if rate_table.is_empty() {
        return 0.0;
    }
    let mut bands = rate_table.to_vec();
    bands.sort_by(|a, b| {
        a.max_wt
            .partial_cmp(&b.max_wt)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for band in &bands {
        if billable_weight_lb <= band.max_wt {
            return band.cost;
        }
    }
    bands[bands.len() - 1].cost
}

/// Linear shipping estimate from supplier hard costs:
/// base + per-pound rate * billable weight, floored at 0.
pub fn linear_shipping(billable_weight_lb: f64, base: f64, per_lb: f64) -> f64 {
    (base + per_lb * billable_weight_lb).max(0.0)
}
