//! Shared utility functions.
//!
//! - `format`: Human-readable formatting (sizes, durations)
//! - `mime`: Content sniffing and declared-format checks

mod format;
mod mime;

pub use format::{format_duration, format_size};
pub use mime::{check_declared_format, sniff_mime, FormatCheck};
