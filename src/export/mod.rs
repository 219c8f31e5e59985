//! Serialization of extraction results for download or display.

use thiserror::Error;

use crate::models::{DocumentResult, TableBlock};

/// Errors while rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("CSV writer error: {0}")]
    Writer(String),
}

/// Available export renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Text,
    Markdown,
    Json,
    PageSummary,
    /// 1-indexed table number.
    Table(usize),
}

impl ExportKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Markdown => "text/markdown",
            Self::Json => "application/json",
            Self::PageSummary | Self::Table(_) => "text/csv",
        }
    }
}

/// Download file name for an export of `source`.
pub fn export_filename(source: &str, kind: ExportKind) -> String {
    match kind {
        ExportKind::Text => format!("{}_extracted.txt", source),
        ExportKind::Markdown => format!("{}_extracted.md", source),
        ExportKind::Json => format!("{}_analysis.json", source),
        ExportKind::PageSummary => format!("{}_summary.csv", source),
        ExportKind::Table(n) => format!("table_{}_{}.csv", n, source),
    }
}

/// The concatenated text, page markers included.
pub fn to_text(result: &DocumentResult) -> String {
    result.concatenated_text.clone()
}

/// The concatenated text under a level-one heading naming the source.
pub fn to_markdown(result: &DocumentResult, filename: &str) -> String {
    format!("# {}\n\n{}", filename, result.concatenated_text)
}

/// Every field of the result as pretty-printed JSON.
pub fn to_json(result: &DocumentResult) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// One row per page: page number, characters, words.
pub fn page_summary_csv(result: &DocumentResult) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Page", "Characters", "Words"])?;
    for page in &result.pages {
        writer.write_record([
            page.page_number.to_string(),
            page.character_count.to_string(),
            page.word_count.to_string(),
        ])?;
    }
    finish(writer)
}

/// A table with a header of column indices and rows padded to full width.
pub fn table_csv(table: &TableBlock) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record((0..table.column_count).map(|i| i.to_string()))?;
    for row in table.padded_rows() {
        writer.write_record(row)?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Writer(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
