//! Whitespace-run table detection.
//!
//! A line is a row candidate when splitting it at runs of two or more
//! whitespace characters (or at a single tab) yields at least two fields.
//! Consecutive candidates form a run and a run of two or more rows is a
//! table. Any other line ends the current run; there is no lookahead.
//!
//! This is purely syntactic. Narrow columns separated by single spaces are
//! missed and any two-column list is reported as a table.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::TableBlock;

/// Field separator: a whitespace run of length two or more, or a tab.
static FIELD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}|\t").expect("valid field separator regex"));

/// Split a line into non-empty fields.
pub fn split_fields(line: &str) -> Vec<String> {
    FIELD_SEPARATOR
        .split(line.trim())
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

/// Detects tables in plain text.
#[derive(Debug, Clone)]
pub struct TableDetector {
    min_fields: usize,
    min_rows: usize,
}

impl Default for TableDetector {
    fn default() -> Self {
        Self {
            min_fields: 2,
            min_rows: 2,
        }
    }
}

impl TableDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields of a row candidate, or `None` if the line is not one.
    fn row(&self, line: &str) -> Option<Vec<String>> {
        let fields = split_fields(line);
        (fields.len() >= self.min_fields).then_some(fields)
    }

    /// Detect tables in document order.
    pub fn detect(&self, text: &str) -> Vec<TableBlock> {
        let mut tables = Vec::new();
        let mut current: Vec<Vec<String>> = Vec::new();

        for line in text.lines() {
            match self.row(line) {
                Some(fields) => current.push(fields),
                None => self.flush(&mut current, &mut tables),
            }
        }
        self.flush(&mut current, &mut tables);

        tables
    }

    fn flush(&self, current: &mut Vec<Vec<String>>, tables: &mut Vec<TableBlock>) {
        let rows = std::mem::take(current);
        if rows.len() >= self.min_rows {
            tables.extend(TableBlock::from_rows(rows));
        }
    }
}

/// Detect tables with the default heuristic.
pub fn detect_tables(text: &str) -> Vec<TableBlock> {
    TableDetector::new().detect(text)
}
