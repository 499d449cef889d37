use pricer_core::error::EngineError;
use pricer_core::mapping::{load_mapping, save_mapping, ColumnMapping, MappingFile};
use std::collections::HashMap;
use std::path::PathBuf;

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pricer-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn full_mapping() -> ColumnMapping {
    ColumnMapping::new(HashMap::from([
        ("supplier_sku".to_string(), "Item #".to_string()),
        ("supplier_cost".to_string(), "Dealer Price".to_string()),
        ("qty_available".to_string(), "Qty".to_string()),
        ("msrp".to_string(), "MSRP".to_string()),
    ]))
}

#[test]
fn valid_mapping_passes() {
    let h = headers(&["Item #", "Dealer Price", "Qty", "MSRP", "Extra"]);
    assert!(full_mapping().validate(&h).is_ok());
}

#[test]
fn unmapped_required_field_is_fatal() {
    let mut mapping = full_mapping();
    mapping.fields.remove("supplier_cost");

    let err = mapping
        .validate(&headers(&["Item #", "Qty", "MSRP"]))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnmappedField(f) if f == "supplier_cost"));
}

#[test]
fn blank_mapping_value_counts_as_unmapped() {
    let mut mapping = full_mapping();
    mapping
        .fields
        .insert("qty_available".to_string(), "   ".to_string());

    let err = mapping
        .validate(&headers(&["Item #", "Dealer Price", "MSRP"]))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnmappedField(f) if f == "qty_available"));
}

#[test]
fn required_column_missing_from_header_is_fatal() {
    let err = full_mapping()
        .validate(&headers(&["Item #", "Qty", "MSRP"]))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::MissingColumn { field, column }
            if field == "supplier_cost" && column == "Dealer Price"
    ));
}

#[test]
fn mapped_optional_column_missing_is_also_fatal() {
    // An optional field left unmapped is fine; mapped to a vanished column
    // it is a configuration error.
    let err = full_mapping()
        .validate(&headers(&["Item #", "Dealer Price", "Qty"]))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::MissingColumn { field, .. } if field == "msrp"
    ));
}

#[test]
fn save_then_load_round_trips() {
    let dir = temp_dir();
    let mapping = full_mapping();

    let path = save_mapping(&dir, "KMC", &mapping).unwrap();
    assert!(path.exists());

    let loaded = load_mapping(&dir, "KMC").unwrap().unwrap();
    assert_eq!(loaded, mapping);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn saved_file_carries_supplier_key_and_timestamp() {
    let dir = temp_dir();
    let path = save_mapping(&dir, "ACME", &full_mapping()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let file: MappingFile = serde_json::from_str(&content).unwrap();
    assert_eq!(file.supplier_key, "ACME");
    assert!(!file.saved_at_utc.is_empty());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn loading_an_unsaved_supplier_yields_none() {
    let dir = temp_dir();
    assert!(load_mapping(&dir, "NOBODY").unwrap().is_none());
    std::fs::remove_dir_all(&dir).ok();
}
