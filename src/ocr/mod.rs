//! Text acquisition from PDFs and images.
//!
//! - Poppler (`pdfinfo`, `pdftotext`, `pdftoppm`) for PDF access and rasterization
//! - Tesseract OCR for pages without a usable text layer and for raster inputs
//!
//! [`DocumentExtractor`] ties these together per document.

mod acquire;
mod backend;
mod extractor;
mod pdf;
mod tesseract;
mod tools;

pub use acquire::{AcquiredText, PageTextAcquirer};
pub use backend::{OcrBackend, OcrConfig, OcrError, OcrResult};
pub use extractor::{DocumentExtractor, ExtractionError};
pub use pdf::{parse_pdfinfo, scale_to_dpi, PdfBackend, PdfDocument, PopplerBackend, NATIVE_DPI};
pub use tesseract::TesseractBackend;
pub use tools::{check_binary, check_tools, REQUIRED_TOOLS};
