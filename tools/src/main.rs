//! pricing-runner: headless pricing runs over a supplier feed CSV.
//!
//! Usage:
//!   pricing-runner --supplier KMC --in feed.csv --sku "Item #" --cost "Dealer Price" --qty "Qty"
//!   pricing-runner --supplier KMC --in feed.csv --mapping data/mappings/KMC.json \
//!       --config pricing_config.json --fees marketplace_fees.json \
//!       --marketplace amazon --rounding .99 --outdir output/pricing --db pricing_index.db
//!   pricing-runner ... --preview 25        (price the first N rows, write nothing)

use anyhow::{bail, Result};
use pricer_core::{
    config::{load_fee_rules, PricingConfig},
    feed::preview_feed,
    mapping::{load_mapping, ColumnMapping},
    money::RoundingMode,
    pipeline::{price_preview_rows, run_full_pricing, RunConfig},
    store::{new_output_record, OutputStore},
};
use std::collections::HashMap;
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let supplier = match arg_str(&args, "--supplier") {
        Some(s) => s,
        None => bail!("--supplier is required"),
    };
    let in_path = match arg_str(&args, "--in") {
        Some(s) => s,
        None => bail!("--in is required (input supplier CSV path)"),
    };

    let marketplace = arg_str(&args, "--marketplace").unwrap_or_else(|| "amazon".to_string());
    let min_margin = parse_arg(&args, "--min-margin", 0.15f64);
    let max_margin = parse_arg(&args, "--max-margin", 0.35f64);
    let preview_rows = parse_arg(&args, "--preview", 0usize);
    let outdir = arg_str(&args, "--outdir").unwrap_or_else(|| "output/pricing".to_string());
    let db = arg_str(&args, "--db").unwrap_or_else(|| "pricing_index.db".to_string());

    let rounding = match arg_str(&args, "--rounding") {
        Some(s) => match RoundingMode::from_arg(&s) {
            Some(mode) => mode,
            None => bail!("unknown rounding mode {s:?} (expected cents, .99 or none)"),
        },
        None => RoundingMode::EndsIn99,
    };

    // Column mapping: a saved mapping file wins, else build one from flags.
    let mapping = if let Some(mapping_path) = arg_str(&args, "--mapping") {
        let path = Path::new(&mapping_path);
        let dir = path.parent().unwrap_or(Path::new("."));
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&supplier);
        match load_mapping(dir, stem)? {
            Some(m) => m,
            None => bail!("mapping file not found: {mapping_path}"),
        }
    } else {
        mapping_from_flags(&args)?
    };

    let mut run_cfg = RunConfig::new(marketplace.clone());
    run_cfg.min_margin = min_margin;
    run_cfg.max_margin = max_margin;
    run_cfg.rounding_mode = rounding;

    if let Some(config_path) = arg_str(&args, "--config") {
        let cfg = PricingConfig::load(Path::new(&config_path))?;
        run_cfg.hard_costs = cfg.hard_costs(&supplier);
    }
    if let Some(fees_path) = arg_str(&args, "--fees") {
        run_cfg.fee_rules = load_fee_rules(Path::new(&fees_path));
    }

    if preview_rows > 0 {
        let data = std::fs::read(&in_path)?;
        let (headers, rows) = preview_feed(&data, preview_rows)?;
        mapping.validate(&headers)?;
        let priced = price_preview_rows(&rows, &mapping, &run_cfg);
        for row in &priced {
            println!("{}", serde_json::to_string(row)?);
        }
        log::info!("previewed {} rows from {in_path}", priced.len());
        return Ok(());
    }

    let output = run_full_pricing(Path::new(&in_path), &mapping, &run_cfg, Path::new(&outdir))?;

    let store = OutputStore::open(&db)?;
    store.migrate()?;
    let record = new_output_record(
        &supplier,
        &marketplace,
        &output.path.to_string_lossy(),
        output.rows,
    );
    store.insert_output(&record)?;

    println!("OK");
    println!("Rows:   {}", output.rows);
    println!("Out:    {}", output.path.display());
    println!("Output: {}", record.output_id);
    Ok(())
}

/// Build a column mapping from --sku/--cost/--qty and the optional
/// column flags.
fn mapping_from_flags(args: &[String]) -> Result<ColumnMapping> {
    let mut fields = HashMap::new();

    for (flag, field) in [
        ("--sku", "supplier_sku"),
        ("--cost", "supplier_cost"),
        ("--qty", "qty_available"),
    ] {
        match arg_str(args, flag) {
            Some(column) => {
                fields.insert(field.to_string(), column);
            }
            None => bail!("{flag} is required when no --mapping file is given"),
        }
    }

    for (flag, field) in [
        ("--upc", "upc"),
        ("--name", "title"),
        ("--brand", "brand"),
        ("--map", "map_price"),
        ("--msrp", "msrp"),
        ("--weight-oz", "weight_oz"),
        ("--length", "length_in"),
        ("--width", "width_in"),
        ("--height", "height_in"),
    ] {
        if let Some(column) = arg_str(args, flag) {
            fields.insert(field.to_string(), column);
        }
    }

    Ok(ColumnMapping::new(fields))
}

fn arg_str(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
