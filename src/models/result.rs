//! Extraction results: pages, tables, and the assembled document.

use serde::{Deserialize, Serialize};

/// How a page's text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Embedded text layer.
    Native,
    /// Rasterized and recognized.
    Ocr,
    /// Acquisition failed; the page degraded to empty text.
    Failed,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Ocr => "ocr",
            Self::Failed => "failed",
        }
    }
}

/// A run of table-like lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    pub row_count: usize,
    /// Widest row; rows may be ragged.
    pub column_count: usize,
    pub data: Vec<Vec<String>>,
}

impl TableBlock {
    /// Build a table from its rows. Returns `None` for fewer than two rows.
    pub fn from_rows(data: Vec<Vec<String>>) -> Option<Self> {
        if data.len() < 2 {
            return None;
        }
        let column_count = data.iter().map(Vec::len).max().unwrap_or(0);
        Some(Self {
            row_count: data.len(),
            column_count,
            data,
        })
    }

    /// Rows padded with empty cells to `column_count`.
    pub fn padded_rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.data.iter().map(move |row| {
            let mut cells: Vec<&str> = row.iter().map(String::as_str).collect();
            cells.resize(self.column_count, "");
            cells
        })
    }
}

/// Text and tables for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed.
    pub page_number: u32,
    pub text: String,
    pub character_count: usize,
    pub word_count: usize,
    pub method: ExtractionMethod,
    pub tables: Vec<TableBlock>,
}

impl PageResult {
    pub fn new(
        page_number: u32,
        text: String,
        method: ExtractionMethod,
        tables: Vec<TableBlock>,
    ) -> Self {
        Self {
            page_number,
            character_count: text.chars().count(),
            word_count: text.split_whitespace().count(),
            text,
            method,
            tables,
        }
    }

    /// A page whose acquisition failed.
    pub fn failed(page_number: u32) -> Self {
        Self::new(page_number, String::new(), ExtractionMethod::Failed, Vec::new())
    }
}

/// Document-level attributes reported by the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    /// Container format and version, e.g. "PDF-1.7".
    pub format: Option<String>,
    pub encrypted: bool,
}

/// The assembled result of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub page_count: u32,
    pub pages: Vec<PageResult>,
    pub concatenated_text: String,
    pub tables: Vec<TableBlock>,
    pub source_metadata: SourceMetadata,
}

impl DocumentResult {
    /// Marker inserted ahead of each page's text in `concatenated_text`.
    pub fn page_marker(page_number: u32) -> String {
        format!("\n\n=== Page {} ===\n\n", page_number)
    }

    /// Assemble a multi-page result. Pages must already be in page order.
    pub fn from_pages(pages: Vec<PageResult>, source_metadata: SourceMetadata) -> Self {
        let mut concatenated_text = String::new();
        for page in &pages {
            concatenated_text.push_str(&Self::page_marker(page.page_number));
            concatenated_text.push_str(&page.text);
        }
        Self::assemble(pages, concatenated_text, source_metadata)
    }

    /// Assemble a single-image result; no marker is inserted for a lone raster.
    pub fn from_single_page(page: PageResult) -> Self {
        let concatenated_text = page.text.clone();
        Self::assemble(vec![page], concatenated_text, SourceMetadata::default())
    }

    fn assemble(
        pages: Vec<PageResult>,
        concatenated_text: String,
        source_metadata: SourceMetadata,
    ) -> Self {
        let tables = pages.iter().flat_map(|p| p.tables.iter().cloned()).collect();
        Self {
            page_count: pages.len() as u32,
            pages,
            concatenated_text,
            tables,
            source_metadata,
        }
    }

    /// Characters in the concatenated text.
    pub fn character_count(&self) -> usize {
        self.concatenated_text.chars().count()
    }

    /// Sum of per-page word counts.
    pub fn word_count(&self) -> usize {
        self.pages.iter().map(|p| p.word_count).sum()
    }

    pub fn page(&self, page_number: u32) -> Option<&PageResult> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }

    /// Pages that fell back to OCR.
    pub fn ocr_page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.method == ExtractionMethod::Ocr)
            .count()
    }
}
