//! Feed bytes -> decoded text -> parsed rows.
//!
//! Supplier feeds arrive in whatever encoding the supplier's export tool
//! produced. Decoding tries UTF-8 (BOM-aware), then Windows-1252, then a
//! lossy Latin-1 last resort, so bad bytes degrade single cells rather than
//! killing the upload. Only a genuinely empty upload is fatal.

use crate::error::{EngineError, EngineResult};
use crate::types::UploadId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One raw feed row: source column name -> cell text.
/// Column order lives in the header list carried alongside.
pub type RawRow = HashMap<String, String>;

/// Decode raw upload bytes with the encoding preference chain.
pub fn decode_feed_bytes(data: &[u8]) -> EngineResult<String> {
    if data.is_empty() {
        return Err(EngineError::EmptyUpload);
    }

    // UTF-8 first (encoding_rs strips a BOM itself).
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(data);
    if !had_errors {
        return Ok(text.into_owned());
    }

    let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(data);
    if !had_errors {
        return Ok(text.into_owned());
    }

    // Latin-1 maps every byte; nothing is ever lost past this point.
    Ok(encoding_rs::mem::decode_latin1(data).into_owned())
}

/// Parse decoded CSV text into an ordered header list plus rows.
///
/// Rows are flexible-length: short rows pad missing cells with "", long rows
/// drop the unnamed overflow, matching how ops teams hand-edit feeds.
pub fn parse_feed(text: &str) -> EngineResult<(Vec<String>, Vec<RawRow>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = RawRow::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            row.insert(header.clone(), record.get(idx).unwrap_or("").to_string());
        }
        rows.push(row);
    }
    Ok((headers, rows))
}

/// Preview mode: decode once, return the header and at most `max_rows` rows.
/// Nothing is written to storage.
pub fn preview_feed(data: &[u8], max_rows: usize) -> EngineResult<(Vec<String>, Vec<RawRow>)> {
    let text = decode_feed_bytes(data)?;
    let (headers, mut rows) = parse_feed(&text)?;
    rows.truncate(max_rows);
    Ok((headers, rows))
}

/// Save an uploaded feed under a fresh id so later full runs can re-read it.
pub fn save_upload_bytes(uploads_dir: &Path, data: &[u8]) -> EngineResult<(UploadId, PathBuf)> {
    if data.is_empty() {
        return Err(EngineError::EmptyUpload);
    }
    std::fs::create_dir_all(uploads_dir)?;
    let upload_id = uuid::Uuid::new_v4().to_string();
    let path = uploads_dir.join(format!("{upload_id}.csv"));
    std::fs::write(&path, data)?;
    log::debug!("feed: saved upload {upload_id} ({} bytes)", data.len());
    Ok((upload_id, path))
}
