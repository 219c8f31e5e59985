//! Data models for docsift.

mod document;
mod fingerprint;
mod history;
mod result;

pub use document::{DocumentFormat, RawDocument};
pub use fingerprint::{fingerprint, ContentFingerprint};
pub use history::{HistoryRecord, HistoryStats, HistorySummary};
pub use result::{DocumentResult, ExtractionMethod, PageResult, SourceMetadata, TableBlock};
