//! Persisted pricing configuration: per-supplier hard costs and fee tables.
//!
//! Flat JSON on disk, read fully at the start of a request, written
//! atomically (temp file + rename) at the end of an update. Concurrent
//! writers are the caller's problem — single-writer convention.

use crate::error::EngineResult;
use crate::fees::{FeeRule, FeeTable};
use crate::types::SupplierKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// The only hard-cost keys accepted on write. Anything else in an update
/// payload is silently dropped.
pub const ALLOWED_HARD_COST_KEYS: [&str; 7] = [
    "dropship_fee",
    "handling_fee",
    "misc_fee",
    "shipping_base",
    "shipping_per_lb",
    "dim_divisor",
    "marketplace_fee_pct_override",
];

/// Supplier-level fixed costs feeding the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HardCosts {
    #[serde(default)]
    pub dropship_fee: f64,
    #[serde(default)]
    pub handling_fee: f64,
    #[serde(default)]
    pub misc_fee: f64,
    #[serde(default)]
    pub shipping_base: f64,
    #[serde(default)]
    pub shipping_per_lb: f64,
    #[serde(default)]
    pub dim_divisor: f64,
    /// When > 0, replaces the fee table's percent for this supplier's runs.
    #[serde(default)]
    pub marketplace_fee_pct_override: f64,
}

/// Accept JSON numbers and numeric strings; anything else is skipped.
fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

impl HardCosts {
    /// Apply a loose key/value update payload.
    ///
    /// Unknown keys are silently dropped and non-numeric values silently
    /// skipped — round-trip compatibility with the persisted file contract.
    pub fn apply_updates(&mut self, updates: &HashMap<String, Value>) {
        for (key, value) in updates {
            let Some(n) = numeric(value) else {
                log::debug!("config: skipping non-numeric hard cost {key}");
                continue;
            };
            match key.as_str() {
                "dropship_fee" => self.dropship_fee = n,
                "handling_fee" => self.handling_fee = n,
                "misc_fee" => self.misc_fee = n,
                "shipping_base" => self.shipping_base = n,
                "shipping_per_lb" => self.shipping_per_lb = n,
                "dim_divisor" => self.dim_divisor = n,
                "marketplace_fee_pct_override" => self.marketplace_fee_pct_override = n,
                _ => {}
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierEntry {
    pub key: SupplierKey,
    #[serde(default)]
    pub hard_costs: HardCosts,
}

/// On-disk shape: `{version, suppliers: {key: {key, hard_costs}}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub suppliers: HashMap<SupplierKey, SupplierEntry>,
}

fn default_version() -> u32 {
    1
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            version: 1,
            suppliers: HashMap::new(),
        }
    }
}

impl PricingConfig {
    /// Load from disk. A missing file is an empty config, not an error;
    /// an unreadable or malformed file is.
    pub fn load(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Atomic save: write a temp file next to the target and rename over it.
    pub fn save(&self, path: &Path) -> EngineResult<()> {
        let payload = serde_json::to_string_pretty(self)?;
        atomic_write(path, &payload)?;
        log::info!(
            "config: saved pricing config ({} suppliers) to {}",
            self.suppliers.len(),
            path.display()
        );
        Ok(())
    }

    /// Hard costs for a supplier, defaults when the supplier is unknown.
    pub fn hard_costs(&self, supplier_key: &str) -> HardCosts {
        self.suppliers
            .get(supplier_key)
            .map(|s| s.hard_costs)
            .unwrap_or_default()
    }

    /// Merge an update payload into one supplier's hard costs, creating the
    /// supplier entry on first write. Returns the resulting costs.
    pub fn update_supplier(
        &mut self,
        supplier_key: &str,
        updates: &HashMap<String, Value>,
    ) -> HardCosts {
        let entry = self
            .suppliers
            .entry(supplier_key.to_string())
            .or_insert_with(|| SupplierEntry {
                key: supplier_key.to_string(),
                hard_costs: HardCosts::default(),
            });
        entry.hard_costs.apply_updates(updates);
        entry.hard_costs
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let mut cfg = Self::default();
        cfg.suppliers.insert(
            "KMC".into(),
            SupplierEntry {
                key: "KMC".into(),
                hard_costs: HardCosts {
                    dropship_fee: 1.0,
                    handling_fee: 0.5,
                    misc_fee: 0.0,
                    shipping_base: 0.0,
                    shipping_per_lb: 0.0,
                    dim_divisor: 139.0,
                    marketplace_fee_pct_override: 0.0,
                },
            },
        );
        cfg
    }
}

/// Load a flat category fee table (`marketplace_fees.json`). Missing or
/// malformed files resolve to an empty table: fees degrade to zero rather
/// than blocking a run.
pub fn load_fee_table(path: &Path) -> FeeTable {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("config: malformed fee table {}: {e}", path.display());
            FeeTable::new()
        }),
        Err(_) => FeeTable::new(),
    }
}

/// Load per-marketplace fee rules for the pipeline, same degrade-to-empty
/// semantics as `load_fee_table`.
pub fn load_fee_rules(path: &Path) -> HashMap<String, FeeRule> {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("config: malformed fee rules {}: {e}", path.display());
            HashMap::new()
        }),
        Err(_) => HashMap::new(),
    }
}

/// Write-then-rename so readers never observe a half-written file.
pub(crate) fn atomic_write(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
