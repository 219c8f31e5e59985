//! Per-page choice between embedded text and OCR.

use image::DynamicImage;
use tracing::debug;

use super::backend::OcrBackend;
use super::extractor::ExtractionError;
use super::pdf::PdfDocument;
use crate::config::ExtractionConfig;
use crate::models::ExtractionMethod;

/// Text obtained for one page and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredText {
    pub text: String,
    pub method: ExtractionMethod,
}

/// Decides, per page, whether the embedded text is good enough or the page
/// has to be rasterized and recognized.
pub struct PageTextAcquirer<'a> {
    ocr: &'a dyn OcrBackend,
    config: &'a ExtractionConfig,
}

impl<'a> PageTextAcquirer<'a> {
    pub fn new(ocr: &'a dyn OcrBackend, config: &'a ExtractionConfig) -> Self {
        Self { ocr, config }
    }

    /// Whether embedded text this short should be replaced by OCR output.
    pub fn needs_ocr(&self, native_text: &str) -> bool {
        self.config.ocr_enabled && native_text.trim().chars().count() < self.config.ocr_min_chars
    }

    /// Acquire the text of a 1-indexed PDF page.
    ///
    /// Embedded text is always tried first. OCR runs only when it is enabled
    /// and the stripped embedded text is under `ocr_min_chars`; the short
    /// embedded text is then discarded.
    pub fn acquire(
        &self,
        document: &dyn PdfDocument,
        page: u32,
    ) -> Result<AcquiredText, ExtractionError> {
        let native = document.page_text(page)?;
        if !self.needs_ocr(&native) {
            return Ok(AcquiredText {
                text: native,
                method: ExtractionMethod::Native,
            });
        }

        debug!(
            "Page {} has {} embedded characters, rasterizing at {}x for OCR",
            page,
            native.trim().chars().count(),
            self.config.raster_scale
        );
        let image = document.render_page(page, self.config.raster_scale)?;
        self.acquire_ocr(&image)
    }

    /// OCR branch alone, for inputs with no text layer.
    pub fn acquire_ocr(&self, image: &DynamicImage) -> Result<AcquiredText, ExtractionError> {
        let result = self.ocr.recognize(image, &self.config.language)?;
        debug!(
            "{} recognized {} characters in {}ms",
            result.backend,
            result.text.chars().count(),
            result.processing_time_ms
        );
        Ok(AcquiredText {
            text: result.text,
            method: ExtractionMethod::Ocr,
        })
    }
}
