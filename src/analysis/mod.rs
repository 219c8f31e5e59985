//! Analysis over extracted text: table detection and search.

mod search;
mod tables;

pub use search::{search, SearchMatch, PREVIEW_CHARS};
pub use tables::{detect_tables, split_fields, TableDetector};
