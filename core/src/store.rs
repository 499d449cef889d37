//! SQLite persistence for generated-output and upload indexes.
//!
//! RULE: Only store.rs talks to the database. The pipeline and callers go
//! through these methods — they never execute SQL directly.
//!
//! This replaces the legacy process-global output map: ids handed to a
//! caller remain resolvable after a restart.

use crate::error::EngineResult;
use crate::types::OutputId;
use rusqlite::{params, Connection};

pub struct OutputStore {
    conn: Connection,
}

/// One generated output file, as indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub output_id: OutputId,
    pub supplier_key: String,
    pub marketplace: String,
    pub path: String,
    pub row_count: i64,
    pub created_at: String,
}

impl OutputStore {
    /// Open (or create) the index database at `path`.
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Output index ───────────────────────────────────────────

    pub fn insert_output(&self, record: &OutputRecord) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO output_index
               (output_id, supplier_key, marketplace, path, row_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.output_id,
                record.supplier_key,
                record.marketplace,
                record.path,
                record.row_count,
                record.created_at,
            ],
        )?;
        log::debug!(
            "store: indexed output {} ({} rows)",
            record.output_id,
            record.row_count
        );
        Ok(())
    }

    /// Resolve an output id to its file path, None if unknown.
    pub fn output_path(&self, output_id: &str) -> EngineResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM output_index WHERE output_id = ?1")?;
        let path = stmt
            .query_row(params![output_id], |row| row.get::<_, String>(0))
            .ok();
        Ok(path)
    }

    /// Most recent outputs first.
    pub fn list_outputs(&self, limit: usize) -> EngineResult<Vec<OutputRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT output_id, supplier_key, marketplace, path, row_count, created_at
             FROM output_index
             ORDER BY created_at DESC, output_id ASC
             LIMIT ?1",
        )?;
        let records = stmt
            .query_map(params![limit as i64], |row| {
                Ok(OutputRecord {
                    output_id: row.get(0)?,
                    supplier_key: row.get(1)?,
                    marketplace: row.get(2)?,
                    path: row.get(3)?,
                    row_count: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    // ── Upload index ───────────────────────────────────────────

    pub fn insert_upload(&self, upload_id: &str, path: &str) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO upload_index (upload_id, path, created_at) VALUES (?1, ?2, ?3)",
            params![upload_id, path, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn upload_path(&self, upload_id: &str) -> EngineResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM upload_index WHERE upload_id = ?1")?;
        let path = stmt
            .query_row(params![upload_id], |row| row.get::<_, String>(0))
            .ok();
        Ok(path)
    }
}

/// Convenience for indexing a fresh output with a new id and timestamp.
pub fn new_output_record(
    supplier_key: &str,
    marketplace: &str,
    path: &str,
    row_count: usize,
) -> OutputRecord {
    OutputRecord {
        output_id: uuid::Uuid::new_v4().to_string(),
        supplier_key: supplier_key.to_string(),
        marketplace: marketplace.to_string(),
        path: path.to_string(),
        row_count: row_count as i64,
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}
