//! Raw row + column mapping -> canonical record + warnings.
//!
//! Normalization never aborts a row. It always returns a best-effort record
//! plus the list of per-field warnings; downstream pricing decides what an
//! unpriceable record means.

use crate::feed::RawRow;
use crate::mapping::ColumnMapping;
use crate::money::{parse_money, parse_quantity};
use crate::shipping::ProductDims;
use serde::Serialize;

/// One canonical feed record. Optional numerics are None on parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub supplier_sku: String,
    pub supplier_cost: Option<f64>,
    pub qty_available: Option<i64>,
    pub upc: String,
    pub title: String,
    pub brand: String,
    pub map_price: Option<f64>,
    pub msrp: Option<f64>,
    pub weight_oz: Option<f64>,
    pub length_in: Option<f64>,
    pub width_in: Option<f64>,
    pub height_in: Option<f64>,
}

impl NormalizedRecord {
    /// A record with a blank SKU or an unparsable cost cannot be priced.
    /// It still flows through the pipeline carrying its warnings.
    pub fn is_priceable(&self) -> bool {
        !self.supplier_sku.is_empty() && self.supplier_cost.is_some()
    }

    /// Actual weight in pounds (feeds report ounces).
    pub fn weight_lb(&self) -> f64 {
        self.weight_oz.unwrap_or(0.0).max(0.0) / 16.0
    }

    pub fn dims(&self) -> ProductDims {
        ProductDims {
            length_in: self.length_in.unwrap_or(0.0),
            width_in: self.width_in.unwrap_or(0.0),
            height_in: self.height_in.unwrap_or(0.0),
            weight_lb: self.weight_lb(),
        }
    }
}

/// Map one raw row into a canonical record, collecting per-field warnings.
pub fn normalize_row(row: &RawRow, mapping: &ColumnMapping) -> (NormalizedRecord, Vec<String>) {
    let pick = |field: &str| -> &str {
        mapping
            .column_for(field)
            .and_then(|col| row.get(col))
            .map(String::as_str)
            .unwrap_or("")
    };

    let supplier_sku = pick("supplier_sku").trim().to_string();
    let supplier_cost = parse_money(pick("supplier_cost"));
    let qty_available = parse_quantity(pick("qty_available"));

    let mut warnings = Vec::new();
    if supplier_sku.is_empty() {
        warnings.push("Missing supplier_sku".to_string());
    }
    if supplier_cost.is_none() {
        warnings.push("Invalid supplier_cost".to_string());
    }
    if qty_available.is_none() {
        warnings.push("Invalid qty_available".to_string());
    }

    let record = NormalizedRecord {
        supplier_sku,
        supplier_cost,
        qty_available,
        upc: pick("upc").trim().to_string(),
        title: pick("title").trim().to_string(),
        brand: pick("brand").trim().to_string(),
        map_price: parse_money(pick("map_price")),
        msrp: parse_money(pick("msrp")),
        weight_oz: parse_money(pick("weight_oz")),
        length_in: parse_money(pick("length_in")),
        width_in: parse_money(pick("width_in")),
        height_in: parse_money(pick("height_in")),
    };
    (record, warnings)
}
