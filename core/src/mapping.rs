//! Per-supplier column mapping: canonical field -> source CSV column.
//!
//! Mapping mistakes are configuration errors and are caught by `validate`
//! against the current file header, before any pricing starts. Row-level
//! data problems are handled later, in normalization.

use crate::config::atomic_write;
use crate::error::{EngineError, EngineResult};
use crate::types::SupplierKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fields a feed cannot be priced without.
pub const REQUIRED_FIELDS: [&str; 3] = ["supplier_sku", "supplier_cost", "qty_available"];

/// Fields that enrich pricing when present.
pub const OPTIONAL_FIELDS: [&str; 9] = [
    "upc",
    "title",
    "brand",
    "map_price",
    "msrp",
    "weight_oz",
    "length_in",
    "width_in",
    "height_in",
];

/// Canonical field name -> source column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    pub fields: HashMap<String, String>,
}

impl ColumnMapping {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// The source column mapped to a canonical field, if any non-blank
    /// mapping exists.
    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|c| !c.trim().is_empty())
    }

    /// Validate this mapping against a file header.
    ///
    /// Every required field must be mapped, and every mapped column
    /// (required or optional) must exist in the header. Both failures are
    /// fatal configuration errors.
    pub fn validate(&self, headers: &[String]) -> EngineResult<()> {
        for field in REQUIRED_FIELDS {
            let column = self
                .column_for(field)
                .ok_or_else(|| EngineError::UnmappedField(field.to_string()))?;
            if !headers.iter().any(|h| h == column) {
                return Err(EngineError::MissingColumn {
                    field: field.to_string(),
                    column: column.to_string(),
                });
            }
        }
        for field in OPTIONAL_FIELDS {
            if let Some(column) = self.column_for(field) {
                if !headers.iter().any(|h| h == column) {
                    return Err(EngineError::MissingColumn {
                        field: field.to_string(),
                        column: column.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// On-disk shape of a saved mapping file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingFile {
    pub supplier_key: SupplierKey,
    pub saved_at_utc: String,
    pub mapping: ColumnMapping,
}

/// Load the saved mapping for a supplier, None if never saved.
pub fn load_mapping(dir: &Path, supplier_key: &str) -> EngineResult<Option<ColumnMapping>> {
    let path = dir.join(format!("{supplier_key}.json"));
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    let file: MappingFile = serde_json::from_str(&content)?;
    Ok(Some(file.mapping))
}

/// Persist a supplier's mapping (atomic write). Returns the file path.
pub fn save_mapping(
    dir: &Path,
    supplier_key: &str,
    mapping: &ColumnMapping,
) -> EngineResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{supplier_key}.json"));
    let file = MappingFile {
        supplier_key: supplier_key.to_string(),
        saved_at_utc: chrono::Utc::now().to_rfc3339(),
        mapping: mapping.clone(),
    };
    let payload = serde_json::to_string_pretty(&file)?;
    atomic_write(&path, &payload)?;
    log::info!("mapping: saved column mapping for supplier {supplier_key}");
    Ok(path)
}
