//! OCR engine abstraction.
//!
//! Every backend receives a single-channel image. Conversion to luminance
//! happens in [`OcrBackend::recognize`] so no backend can skip it.

use std::path::PathBuf;
use std::time::Instant;

use image::{DynamicImage, GrayImage};
use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(String),
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized text; empty when the engine found nothing.
    pub text: String,
    /// Which backend produced this result.
    pub backend: &'static str,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Check if this backend is available (binaries installed, data present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Core OCR: extract text from a grayscale image.
    ///
    /// `language` is one or more engine language codes joined with `+`,
    /// e.g. `"eng+ara"`.
    fn run_ocr(&self, image: &GrayImage, language: &str) -> Result<String, OcrError>;

    /// Convert to luminance, run OCR, and time the call.
    ///
    /// Blocks for the duration of recognition.
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let gray = image.to_luma8();
        let text = self.run_ocr(&gray, language)?;
        Ok(OcrResult {
            text,
            backend: self.name(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Engine-level settings that do not vary per request.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract page segmentation mode (`--psm`).
    pub page_segmentation_mode: u8,
    /// Override for the tessdata directory.
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            page_segmentation_mode: 3,
            tessdata_dir: None,
        }
    }
}
