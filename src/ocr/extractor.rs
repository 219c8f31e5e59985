//! Whole-document extraction: per-page acquisition, table detection, assembly.

use std::sync::Arc;

use image::DynamicImage;
use thiserror::Error;
use tracing::{info, warn};

use super::acquire::{AcquiredText, PageTextAcquirer};
use super::backend::{OcrBackend, OcrConfig, OcrError};
use super::pdf::{PdfBackend, PopplerBackend};
use super::tesseract::TesseractBackend;
use crate::analysis::TableDetector;
use crate::config::ExtractionConfig;
use crate::models::{DocumentFormat, DocumentResult, PageResult, RawDocument, TableBlock};

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Could not open document: {0}")]
    DocumentOpen(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Whether the whole document is lost, as opposed to a single page.
    pub fn is_document_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_) | Self::DocumentOpen(_) | Self::ToolNotFound(_)
        )
    }
}

/// Extracts text and tables from PDFs and raster images.
///
/// Pages are processed strictly in order on the calling thread; the progress
/// observer sees `(1, n)`, `(2, n)`, ... `(n, n)`.
pub struct DocumentExtractor {
    pdf: Arc<dyn PdfBackend>,
    ocr: Arc<dyn OcrBackend>,
    tables: TableDetector,
}

impl DocumentExtractor {
    pub fn new(pdf: Arc<dyn PdfBackend>, ocr: Arc<dyn OcrBackend>) -> Self {
        Self {
            pdf,
            ocr,
            tables: TableDetector::new(),
        }
    }

    /// Poppler for PDFs, Tesseract for OCR.
    pub fn with_defaults(ocr_config: OcrConfig) -> Self {
        Self::new(
            Arc::new(PopplerBackend::new()),
            Arc::new(TesseractBackend::with_config(ocr_config)),
        )
    }

    pub fn ocr_backend(&self) -> &dyn OcrBackend {
        self.ocr.as_ref()
    }

    /// Extract a document without progress reporting.
    pub fn extract(
        &self,
        document: &RawDocument,
        config: &ExtractionConfig,
    ) -> Result<DocumentResult, ExtractionError> {
        self.extract_with_progress(document, config, &mut |_: u32, _: u32| {})
    }

    /// Extract a document, calling `progress(pages_completed, pages_total)`
    /// after each page.
    ///
    /// A container that cannot be opened, or a missing PDF tool, fails the
    /// call. A page that cannot be read or recognized becomes an empty page
    /// and the document carries on; so does an image that cannot be decoded.
    pub fn extract_with_progress(
        &self,
        document: &RawDocument,
        config: &ExtractionConfig,
        progress: &mut dyn FnMut(u32, u32),
    ) -> Result<DocumentResult, ExtractionError> {
        let result = match document.format() {
            DocumentFormat::Pdf => self.extract_pdf(document, config, progress)?,
            format => self.extract_image(document, format, config, progress)?,
        };

        info!(
            "Extracted {} ({} pages, {} via OCR, {} tables)",
            document.filename(),
            result.page_count,
            result.ocr_page_count(),
            result.tables.len()
        );
        Ok(result)
    }

    fn extract_pdf(
        &self,
        document: &RawDocument,
        config: &ExtractionConfig,
        progress: &mut dyn FnMut(u32, u32),
    ) -> Result<DocumentResult, ExtractionError> {
        let pdf = self.pdf.open(document.content())?;
        let page_count = pdf.page_count();
        let metadata = pdf.metadata();
        let acquirer = PageTextAcquirer::new(self.ocr.as_ref(), config);

        let mut pages = Vec::with_capacity(page_count as usize);
        for page_number in 1..=page_count {
            let page = match acquirer.acquire(pdf.as_ref(), page_number) {
                Ok(acquired) => self.build_page(page_number, acquired, config),
                Err(e) if e.is_document_fatal() => return Err(e),
                Err(e) => {
                    warn!(
                        "Page {} of {} failed, continuing with empty text: {}",
                        page_number,
                        document.filename(),
                        e
                    );
                    PageResult::failed(page_number)
                }
            };
            pages.push(page);
            progress(page_number, page_count);
        }

        Ok(DocumentResult::from_pages(pages, metadata))
    }

    fn extract_image(
        &self,
        document: &RawDocument,
        format: DocumentFormat,
        config: &ExtractionConfig,
        progress: &mut dyn FnMut(u32, u32),
    ) -> Result<DocumentResult, ExtractionError> {
        // No text layer: OCR runs regardless of `ocr_enabled`.
        let acquirer = PageTextAcquirer::new(self.ocr.as_ref(), config);
        let acquired = decode_image(document.content(), format)
            .map_err(ExtractionError::from)
            .and_then(|decoded| acquirer.acquire_ocr(&decoded));

        let page = match acquired {
            Ok(acquired) => self.build_page(1, acquired, config),
            Err(e) => {
                warn!(
                    "OCR failed for {}, continuing with empty text: {}",
                    document.filename(),
                    e
                );
                PageResult::failed(1)
            }
        };
        progress(1, 1);

        Ok(DocumentResult::from_single_page(page))
    }

    fn build_page(
        &self,
        page_number: u32,
        acquired: AcquiredText,
        config: &ExtractionConfig,
    ) -> PageResult {
        let tables: Vec<TableBlock> = if config.tables_enabled {
            self.tables.detect(&acquired.text)
        } else {
            Vec::new()
        };
        PageResult::new(page_number, acquired.text, acquired.method, tables)
    }
}

/// Decode raster bytes; a corrupt image is an engine input error, not a container error.
fn decode_image(content: &[u8], format: DocumentFormat) -> Result<DynamicImage, OcrError> {
    match format.image_format() {
        Some(hint) => image::load_from_memory_with_format(content, hint),
        None => image::load_from_memory(content),
    }
    .map_err(|e| OcrError::ImageError(format!("{} image: {}", format, e)))
}
