//! Pipeline orchestration: normalize + price over a whole feed.
//!
//! Two modes share the per-row logic. Preview prices the first N decoded
//! rows and writes nothing; a full run prices every row and writes one
//! output CSV with a fixed, stable column order. Every input row produces
//! exactly one output row — unpriceable rows are annotated, never dropped.

use crate::calculator::{clamp_ceiling, solve_margin_price, PricingMode};
use crate::config::HardCosts;
use crate::error::EngineResult;
use crate::feed::{decode_feed_bytes, parse_feed, RawRow};
use crate::fees::FeeRule;
use crate::mapping::ColumnMapping;
use crate::money::{round2, round_price, RoundingMode};
use crate::normalize::{normalize_row, NormalizedRecord};
use crate::shipping::{linear_shipping, shipping_from_rate_table, RateBand};
use crate::types::Marketplace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Configuration for one pricing run. Supplied per invocation, never
/// mutated by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub marketplace: Marketplace,
    #[serde(default = "default_min_margin")]
    pub min_margin: f64,
    #[serde(default = "default_max_margin")]
    pub max_margin: f64,
    /// Feed runs ship charm-priced by default.
    #[serde(default = "default_rounding")]
    pub rounding_mode: RoundingMode,
    /// The feed pipeline's legacy formula family is margin-on-price.
    #[serde(default = "default_pricing_mode")]
    pub pricing_mode: PricingMode,
    /// Fee re-evaluation passes for price-dependent fee rules. 1 is the
    /// documented one-pass approximation; more passes opt into refinement.
    #[serde(default = "default_fee_passes")]
    pub fee_passes: u32,
    #[serde(default)]
    pub hard_costs: HardCosts,
    /// Per-marketplace fee models, keyed by lowercased marketplace.
    #[serde(default)]
    pub fee_rules: HashMap<Marketplace, FeeRule>,
    /// When non-empty, overrides the linear hard-cost shipping model.
    #[serde(default)]
    pub shipping_rate_table: Vec<RateBand>,
}

fn default_min_margin() -> f64 {
    0.15
}
fn default_max_margin() -> f64 {
    0.35
}
fn default_rounding() -> RoundingMode {
    RoundingMode::EndsIn99
}
fn default_pricing_mode() -> PricingMode {
    PricingMode::MarginOnPrice
}
fn default_fee_passes() -> u32 {
    1
}

impl RunConfig {
    pub fn new(marketplace: impl Into<Marketplace>) -> Self {
        Self {
            marketplace: marketplace.into(),
            min_margin: default_min_margin(),
            max_margin: default_max_margin(),
            rounding_mode: default_rounding(),
            pricing_mode: default_pricing_mode(),
            fee_passes: default_fee_passes(),
            hard_costs: HardCosts::default(),
            fee_rules: HashMap::new(),
            shipping_rate_table: Vec::new(),
        }
    }

    /// The fee rule in effect for this run. A positive supplier-level
    /// percent override beats the fee-rule table.
    fn fee_rule(&self) -> FeeRule {
        if self.hard_costs.marketplace_fee_pct_override > 0.0 {
            return FeeRule::PercentOfPrice {
                percent: self.hard_costs.marketplace_fee_pct_override,
                per_item: 0.0,
            };
        }
        self.fee_rules
            .get(&self.marketplace.trim().to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Shipping estimate for one record: rate table when configured,
    /// otherwise the linear hard-cost model.
    fn shipping_estimate(&self, record: &NormalizedRecord) -> f64 {
        let billable = record.dims().billable_weight_lb(self.hard_costs.dim_divisor);
        if !self.shipping_rate_table.is_empty() {
            shipping_from_rate_table(billable, &self.shipping_rate_table)
        } else {
            linear_shipping(
                billable,
                self.hard_costs.shipping_base,
                self.hard_costs.shipping_per_lb,
            )
        }
    }
}

/// Fixed output column order for full-run CSVs.
pub const OUTPUT_COLUMNS: [&str; 16] = [
    "supplier_sku",
    "upc",
    "title",
    "brand",
    "supplier_cost",
    "qty_available",
    "dropship_fee",
    "shipping_estimate",
    "base_total_cost",
    "min_price",
    "max_price",
    "marketplace",
    "map_price",
    "msrp",
    "_row_warnings",
    "warnings",
];

/// One priced output row. Price fields stay None for unpriceable records.
#[derive(Debug, Clone, Serialize)]
pub struct PricedRow {
    pub supplier_sku: String,
    pub upc: String,
    pub title: String,
    pub brand: String,
    pub supplier_cost: Option<f64>,
    pub qty_available: Option<i64>,
    pub dropship_fee: f64,
    pub shipping_estimate: f64,
    pub base_total_cost: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub marketplace: Marketplace,
    pub map_price: Option<f64>,
    pub msrp: Option<f64>,
    /// Normalization warnings, semicolon-joined.
    #[serde(rename = "_row_warnings")]
    pub row_warnings: String,
    /// Pricing warnings, semicolon-joined.
    pub warnings: String,
}

/// Margin-on-price bound with the fee added after the solve.
///
/// Pass 1 evaluates the rule against the pre-fee price (the legacy
/// approximation); each further pass re-evaluates it against the refined
/// price. Never an exact fixed point, by configuration.
fn margin_price_with_fee(base_cost: f64, margin: f64, rule: &FeeRule, passes: u32) -> f64 {
    let pre_fee = solve_margin_price(base_cost, margin);
    let mut price = pre_fee + rule.fee_for(pre_fee, "default");
    for _ in 1..passes.max(1) {
        price = pre_fee + rule.fee_for(price, "default");
    }
    price
}

/// Markup-on-cost bound for the feed pipeline: fee from a provisional
/// markup price, then margin applied to the fee-inclusive cost.
fn markup_price_with_fee(base_cost: f64, margin: f64, rule: &FeeRule) -> f64 {
    let fee = rule.fee_for(base_cost * (1.0 + margin), "default");
    (base_cost + fee) * (1.0 + margin)
}

/// Price one normalized record. Pure; all warnings end up on the row.
pub fn price_row(record: &NormalizedRecord, row_warnings: &[String], cfg: &RunConfig) -> PricedRow {
    let hc = &cfg.hard_costs;
    let shipping_estimate = cfg.shipping_estimate(record);

    let mut warnings: Vec<String> = Vec::new();
    let mut base_total_cost = None;
    let mut min_price = None;
    let mut max_price = None;

    if record.supplier_cost.is_none() {
        warnings.push("Cannot price: missing supplier_cost".to_string());
    } else if record.is_priceable() {
        // Cost present and SKU non-blank; a blank SKU leaves the record
        // unpriced, carrying the normalization warning.
        let cost = record.supplier_cost.unwrap_or(0.0);
        let base = cost + hc.dropship_fee + hc.handling_fee + hc.misc_fee + shipping_estimate;
        let rule = cfg.fee_rule();

        let (mut minp, mut maxp) = match cfg.pricing_mode {
            PricingMode::MarginOnPrice => (
                margin_price_with_fee(base, cfg.min_margin, &rule, cfg.fee_passes),
                margin_price_with_fee(base, cfg.max_margin, &rule, cfg.fee_passes),
            ),
            PricingMode::MarkupOnCost => (
                markup_price_with_fee(base, cfg.min_margin, &rule),
                markup_price_with_fee(base, cfg.max_margin, &rule),
            ),
        };

        clamp_ceiling(&mut minp, record.map_price, "MAP", "min_price", &mut warnings);
        clamp_ceiling(&mut maxp, record.map_price, "MAP", "max_price", &mut warnings);
        clamp_ceiling(&mut minp, record.msrp, "MSRP", "min_price", &mut warnings);
        clamp_ceiling(&mut maxp, record.msrp, "MSRP", "max_price", &mut warnings);

        let minp = round_price(minp, cfg.rounding_mode);
        let mut maxp = round_price(maxp, cfg.rounding_mode);
        if maxp < minp {
            warnings.push("max_price < min_price (adjusted)".to_string());
            maxp = minp;
        }

        base_total_cost = Some(round2(base));
        min_price = Some(round2(minp));
        max_price = Some(round2(maxp));
    }

    PricedRow {
        supplier_sku: record.supplier_sku.clone(),
        upc: record.upc.clone(),
        title: record.title.clone(),
        brand: record.brand.clone(),
        supplier_cost: record.supplier_cost,
        qty_available: record.qty_available,
        dropship_fee: round2(hc.dropship_fee),
        shipping_estimate: round2(shipping_estimate),
        base_total_cost,
        min_price,
        max_price,
        marketplace: cfg.marketplace.clone(),
        map_price: record.map_price,
        msrp: record.msrp,
        row_warnings: row_warnings.join("; "),
        warnings: warnings.join("; "),
    }
}

/// Preview mode: normalize + price already-decoded rows. The caller is
/// expected to have validated the mapping against the feed header.
pub fn price_preview_rows(
    rows: &[RawRow],
    mapping: &ColumnMapping,
    cfg: &RunConfig,
) -> Vec<PricedRow> {
    rows.iter()
        .map(|row| {
            let (record, row_warnings) = normalize_row(row, mapping);
            price_row(&record, &row_warnings, cfg)
        })
        .collect()
}

/// Outcome of a full pricing run.
#[derive(Debug, Clone)]
pub struct FullRunOutput {
    pub path: PathBuf,
    pub rows: usize,
}

/// Full-run mode: decode the entire feed, price every row, write one CSV.
///
/// The mapping is validated against the header first — a bad mapping fails
/// here, before any pricing. Row count is preserved: bad rows come out
/// annotated, not dropped.
pub fn run_full_pricing(
    upload_path: &Path,
    mapping: &ColumnMapping,
    cfg: &RunConfig,
    out_dir: &Path,
) -> EngineResult<FullRunOutput> {
    let data = std::fs::read(upload_path)?;
    let text = decode_feed_bytes(&data)?;
    let (headers, rows) = parse_feed(&text)?;
    mapping.validate(&headers)?;

    let priced: Vec<PricedRow> = rows
        .iter()
        .map(|row| {
            let (record, row_warnings) = normalize_row(row, mapping);
            price_row(&record, &row_warnings, cfg)
        })
        .collect();

    std::fs::create_dir_all(out_dir)?;
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let marketplace = cfg.marketplace.trim().to_lowercase();
    let out_path = out_dir.join(format!("pricing_{marketplace}_{stamp}.csv"));

    write_output_csv(&out_path, &priced)?;

    log::info!(
        "pipeline: priced {} rows for {marketplace} -> {}",
        priced.len(),
        out_path.display()
    );
    Ok(FullRunOutput {
        path: out_path,
        rows: priced.len(),
    })
}

fn fmt_f64(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_default()
}

fn fmt_i64(v: Option<i64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn write_output_csv(path: &Path, rows: &[PricedRow]) -> EngineResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(OUTPUT_COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.supplier_sku.as_str(),
            row.upc.as_str(),
            row.title.as_str(),
            row.brand.as_str(),
            &fmt_f64(row.supplier_cost),
            &fmt_i64(row.qty_available),
            &format!("{:.2}", row.dropship_fee),
            &format!("{:.2}", row.shipping_estimate),
            &fmt_f64(row.base_total_cost),
            &fmt_f64(row.min_price),
            &fmt_f64(row.max_price),
            row.marketplace.as_str(),
            &fmt_f64(row.map_price),
            &fmt_f64(row.msrp),
            row.row_warnings.as_str(),
            row.warnings.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
