//! docsift - text and table extraction from PDFs and scanned images.
//!
//! PDF pages use their embedded text when there is enough of it and fall back
//! to OCR otherwise; images always go through OCR. Each page is scanned for
//! whitespace-aligned tables, and every processed document is recorded in a
//! history store keyed by a SHA-256 fingerprint of its bytes.

pub mod analysis;
pub mod config;
pub mod export;
pub mod models;
pub mod ocr;
pub mod repository;
pub mod services;
pub mod utils;
