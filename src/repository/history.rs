//! Processing history keyed by content fingerprint.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use tracing::debug;

use super::{parse_datetime, Result};
use crate::models::{ContentFingerprint, HistoryRecord, HistoryStats, HistorySummary};

const RECORD_COLUMNS: &str = "fingerprint, filename, upload_time, byte_size, page_count, language,
     character_count, word_count, processing_duration, success";

/// SQLite-backed history repository. One row per distinct document content.
pub struct HistoryRepository {
    db_path: PathBuf,
}

impl HistoryRepository {
    /// Open (creating if needed) the history store.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                fingerprint TEXT NOT NULL UNIQUE,
                upload_time TEXT NOT NULL,
                byte_size INTEGER NOT NULL,
                page_count INTEGER NOT NULL,
                language TEXT NOT NULL,
                character_count INTEGER NOT NULL,
                word_count INTEGER NOT NULL,
                processing_duration REAL NOT NULL,
                success INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_history_upload_time
                ON history(upload_time DESC);
        "#,
        )?;
        Ok(())
    }

    /// Insert or replace the row for a fingerprint.
    ///
    /// Every column except the fingerprint is overwritten and the upload time
    /// is refreshed. The write happens in one immediate transaction so
    /// concurrent writers for the same content cannot produce two rows.
    pub fn record(&self, fingerprint: &ContentFingerprint, summary: &HistorySummary) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            r#"
            INSERT INTO history (
                fingerprint, filename, upload_time, byte_size, page_count, language,
                character_count, word_count, processing_duration, success
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(fingerprint) DO UPDATE SET
                filename = excluded.filename,
                upload_time = excluded.upload_time,
                byte_size = excluded.byte_size,
                page_count = excluded.page_count,
                language = excluded.language,
                character_count = excluded.character_count,
                word_count = excluded.word_count,
                processing_duration = excluded.processing_duration,
                success = excluded.success
            "#,
            params![
                fingerprint.as_str(),
                summary.filename,
                Utc::now().to_rfc3339(),
                summary.byte_size as i64,
                summary.page_count as i64,
                summary.language,
                summary.character_count as i64,
                summary.word_count as i64,
                summary.processing_duration.as_secs_f64(),
                summary.success,
            ],
        )?;
        tx.commit()?;

        debug!(
            "Recorded history for {} ({})",
            summary.filename,
            fingerprint.short()
        );
        Ok(())
    }

    /// Fetch the row for a fingerprint.
    pub fn lookup(&self, fingerprint: &ContentFingerprint) -> Result<Option<HistoryRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM history WHERE fingerprint = ?1"
        ))?;

        match stmt.query_row(params![fingerprint.as_str()], row_to_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Count and total characters of successful rows.
    pub fn stats(&self) -> Result<HistoryStats> {
        let conn = self.connect()?;
        let (count, chars): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(character_count), 0) FROM history WHERE success = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(HistoryStats {
            total_successful_count: count.max(0) as u64,
            total_character_count: chars.max(0) as u64,
        })
    }

    /// Most recently processed rows first.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM history ORDER BY upload_time DESC, id DESC LIMIT ?1"
        ))?;

        let records = stmt
            .query_map(params![limit as i64], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Number of rows for a fingerprint. Zero or one.
    pub fn count_for(&self, fingerprint: &ContentFingerprint) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM history WHERE fingerprint = ?1",
            params![fingerprint.as_str()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let stored: String = row.get("fingerprint")?;
    let fingerprint = ContentFingerprint::from_hex(&stored).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("invalid fingerprint '{stored}'").into(),
        )
    })?;
    let seconds: f64 = row.get("processing_duration")?;

    Ok(HistoryRecord {
        fingerprint,
        filename: row.get("filename")?,
        upload_time: parse_datetime(&row.get::<_, String>("upload_time")?),
        byte_size: row.get::<_, i64>("byte_size")?.max(0) as u64,
        page_count: row.get::<_, i64>("page_count")?.max(0) as u32,
        language: row.get("language")?,
        character_count: row.get::<_, i64>("character_count")?.max(0) as u64,
        word_count: row.get::<_, i64>("word_count")?.max(0) as u64,
        processing_duration: Duration::try_from_secs_f64(seconds).unwrap_or_default(),
        success: row.get("success")?,
    })
}
