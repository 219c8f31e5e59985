//! History records: the audit index of processed documents.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::RawDocument;
use super::fingerprint::ContentFingerprint;
use super::result::DocumentResult;

/// Per-run summary written to the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub filename: String,
    pub byte_size: u64,
    pub page_count: u32,
    pub language: String,
    pub character_count: u64,
    pub word_count: u64,
    pub processing_duration: Duration,
    pub success: bool,
}

impl HistorySummary {
    /// Summarize a completed extraction.
    pub fn from_result(
        document: &RawDocument,
        result: &DocumentResult,
        language: &str,
        processing_duration: Duration,
    ) -> Self {
        Self {
            filename: document.filename().to_string(),
            byte_size: document.byte_size(),
            page_count: result.page_count,
            language: language.to_string(),
            character_count: result.character_count() as u64,
            word_count: result.word_count() as u64,
            processing_duration,
            success: true,
        }
    }

    /// Summarize a document whose container could not be opened.
    pub fn failed(document: &RawDocument, language: &str, processing_duration: Duration) -> Self {
        Self {
            filename: document.filename().to_string(),
            byte_size: document.byte_size(),
            page_count: 0,
            language: language.to_string(),
            character_count: 0,
            word_count: 0,
            processing_duration,
            success: false,
        }
    }
}

/// A stored history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub fingerprint: ContentFingerprint,
    pub filename: String,
    pub upload_time: DateTime<Utc>,
    pub byte_size: u64,
    pub page_count: u32,
    pub language: String,
    pub character_count: u64,
    pub word_count: u64,
    pub processing_duration: Duration,
    pub success: bool,
}

/// Aggregates over successful records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_successful_count: u64,
    pub total_character_count: u64,
}
