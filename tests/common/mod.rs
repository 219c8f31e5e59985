//! Fake PDF and OCR backends for pipeline tests.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage};

use docsift::models::{DocumentFormat, RawDocument, SourceMetadata};
use docsift::ocr::{DocumentExtractor, ExtractionError, OcrBackend, OcrError, PdfBackend, PdfDocument};

/// Content prefix the fake PDF backend refuses to open.
pub const BROKEN: &[u8] = b"BROKEN";

/// In-memory PDF: one string per page.
#[derive(Clone, Default)]
pub struct FakePdf {
    pub pages: Vec<String>,
    /// Pages whose embedded text cannot be read.
    pub unreadable: Vec<u32>,
    /// Every page reports the text tool as not installed.
    pub tool_missing: bool,
}

impl FakePdf {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            unreadable: Vec::new(),
            tool_missing: false,
        }
    }
}

impl PdfBackend for FakePdf {
    fn open(&self, content: &[u8]) -> Result<Box<dyn PdfDocument>, ExtractionError> {
        if content.starts_with(BROKEN) {
            return Err(ExtractionError::DocumentOpen("not a PDF".to_string()));
        }
        Ok(Box::new(self.clone()))
    }
}

impl PdfDocument for FakePdf {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            title: Some("Fake".to_string()),
            format: Some("PDF-1.7".to_string()),
            ..Default::default()
        }
    }

    fn page_text(&self, page: u32) -> Result<String, ExtractionError> {
        if self.tool_missing {
            return Err(ExtractionError::ToolNotFound("pdftotext".to_string()));
        }
        if self.unreadable.contains(&page) {
            return Err(ExtractionError::ExtractionFailed(format!("page {}", page)));
        }
        Ok(self.pages[(page - 1) as usize].clone())
    }

    /// 100x(10*page) points, scaled.
    fn render_page(&self, page: u32, scale: f32) -> Result<DynamicImage, ExtractionError> {
        let width = (100.0 * scale) as u32;
        let height = (10.0 * page as f32 * scale) as u32;
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([250, 250, 250]),
        )))
    }
}

/// Returns fixed text and records every call.
#[derive(Default)]
pub struct ScriptedOcr {
    pub text: String,
    /// (width, height, language) per call.
    pub calls: Mutex<Vec<(u32, u32, String)>>,
}

impl ScriptedOcr {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(u32, u32, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl OcrBackend for ScriptedOcr {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        String::new()
    }

    fn run_ocr(&self, image: &GrayImage, language: &str) -> Result<String, OcrError> {
        self.calls
            .lock()
            .unwrap()
            .push((image.width(), image.height(), language.to_string()));
        Ok(self.text.clone())
    }
}

/// Fails the test if OCR is ever invoked.
pub struct PanicOcr;

impl OcrBackend for PanicOcr {
    fn name(&self) -> &'static str {
        "panic"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        String::new()
    }

    fn run_ocr(&self, _image: &GrayImage, _language: &str) -> Result<String, OcrError> {
        panic!("OCR must not run for this input");
    }
}

/// Always errors.
pub struct FailingOcr;

impl OcrBackend for FailingOcr {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn availability_hint(&self) -> String {
        "never available".to_string()
    }

    fn run_ocr(&self, _image: &GrayImage, _language: &str) -> Result<String, OcrError> {
        Err(OcrError::OcrFailed("engine crashed".to_string()))
    }
}

/// Sleeps before answering.
pub struct SlowOcr {
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl SlowOcr {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }
}

impl OcrBackend for SlowOcr {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        String::new()
    }

    fn run_ocr(&self, _image: &GrayImage, _language: &str) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok("late text".to_string())
    }
}

pub fn extractor(pdf: FakePdf, ocr: Arc<dyn OcrBackend>) -> DocumentExtractor {
    DocumentExtractor::new(Arc::new(pdf), ocr)
}

pub fn pdf_document(content: &[u8]) -> RawDocument {
    RawDocument::new(content.to_vec(), DocumentFormat::Pdf, "scan.pdf")
}

/// A small PNG encoded in memory.
pub fn png_document(width: u32, height: u32) -> RawDocument {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 60, 90])));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    RawDocument::new(bytes.into_inner(), DocumentFormat::Png, "photo.png")
}

/// Embedded text comfortably above the default OCR threshold.
pub fn long_text(label: &str) -> String {
    format!(
        "{} contains enough embedded text to skip recognition entirely.",
        label
    )
}
