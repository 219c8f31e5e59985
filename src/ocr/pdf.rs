//! PDF container access: page count, metadata, embedded text, rasterization.
//!
//! The default implementation shells out to Poppler (`pdfinfo`, `pdftotext`,
//! `pdftoppm`). The document bytes are written once to a scratch directory
//! that lives as long as the opened document.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tempfile::TempDir;

use super::extractor::ExtractionError;
use super::tools::{
    classify_output, CommandOutcome, PDFINFO_NOT_FOUND, PDFTOPPM_NOT_FOUND, PDFTOTEXT_NOT_FOUND,
};
use crate::models::SourceMetadata;

/// PDF points per inch; a raster scale of 1.0 renders at this resolution.
pub const NATIVE_DPI: f32 = 72.0;

/// An opened PDF.
pub trait PdfDocument {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Document-level attributes.
    fn metadata(&self) -> SourceMetadata;

    /// Embedded text of a 1-indexed page.
    fn page_text(&self, page: u32) -> Result<String, ExtractionError>;

    /// Render a 1-indexed page at `scale` times its native resolution on both axes.
    fn render_page(&self, page: u32, scale: f32) -> Result<DynamicImage, ExtractionError>;
}

/// Opens PDF containers.
pub trait PdfBackend: Send + Sync {
    /// Open a document, failing with [`ExtractionError::DocumentOpen`] if the
    /// container is unreadable.
    fn open(&self, content: &[u8]) -> Result<Box<dyn PdfDocument>, ExtractionError>;
}

/// Poppler command-line backend.
#[derive(Debug, Default, Clone)]
pub struct PopplerBackend;

impl PopplerBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for PopplerBackend {
    fn open(&self, content: &[u8]) -> Result<Box<dyn PdfDocument>, ExtractionError> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("document.pdf");
        std::fs::write(&path, content)?;

        let info = run_tool(
            Command::new("pdfinfo").arg(&path).output(),
            PDFINFO_NOT_FOUND,
        )
        .map_err(|e| match e {
            ExtractionError::ExtractionFailed(msg) => ExtractionError::DocumentOpen(msg),
            other => other,
        })?;

        let (page_count, metadata) = parse_pdfinfo(&info);
        let page_count = page_count.ok_or_else(|| {
            ExtractionError::DocumentOpen("pdfinfo reported no page count".to_string())
        })?;

        Ok(Box::new(PopplerDocument {
            _temp_dir: temp_dir,
            path,
            page_count,
            metadata,
        }))
    }
}

/// A PDF opened through Poppler.
struct PopplerDocument {
    _temp_dir: TempDir,
    path: PathBuf,
    page_count: u32,
    metadata: SourceMetadata,
}

impl PdfDocument for PopplerDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn metadata(&self) -> SourceMetadata {
        self.metadata.clone()
    }

    fn page_text(&self, page: u32) -> Result<String, ExtractionError> {
        let page_str = page.to_string();
        let output = Command::new("pdftotext")
            .args(["-layout", "-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
            .arg(&self.path)
            .arg("-") // Output to stdout
            .output();

        let text = run_tool(output, PDFTOTEXT_NOT_FOUND)?;
        // pdftotext terminates each page with a form feed.
        Ok(text.trim_end_matches('\u{c}').to_string())
    }

    fn render_page(&self, page: u32, scale: f32) -> Result<DynamicImage, ExtractionError> {
        let output_dir = TempDir::new()?;
        let image_path = pdf_page_to_image(&self.path, page, scale, output_dir.path())?;
        image::open(&image_path).map_err(|e| {
            ExtractionError::ExtractionFailed(format!("Failed to decode page {}: {}", page, e))
        })
    }
}

/// Map a Poppler command result into stdout or an extraction error.
fn run_tool(
    result: std::io::Result<std::process::Output>,
    not_found: &str,
) -> Result<String, ExtractionError> {
    match classify_output(result) {
        CommandOutcome::Success(stdout) => Ok(stdout),
        CommandOutcome::Failed(stderr) => Err(ExtractionError::ExtractionFailed(stderr)),
        CommandOutcome::NotFound => Err(ExtractionError::ToolNotFound(not_found.to_string())),
        CommandOutcome::Io(e) => Err(ExtractionError::Io(e)),
    }
}

/// Resolution in DPI for a raster scale factor.
pub fn scale_to_dpi(scale: f32) -> u32 {
    (NATIVE_DPI * scale).round().max(1.0) as u32
}

/// Convert a PDF page to a PNG using pdftoppm.
fn pdf_page_to_image(
    pdf_path: &Path,
    page: u32,
    scale: f32,
    output_dir: &Path,
) -> Result<PathBuf, ExtractionError> {
    let page_str = page.to_string();
    let dpi = scale_to_dpi(scale).to_string();
    let output_prefix = output_dir.join("page");

    let output = Command::new("pdftoppm")
        .args(["-png", "-singlefile", "-r", &dpi, "-f", &page_str, "-l", &page_str])
        .arg(pdf_path)
        .arg(&output_prefix)
        .output();

    run_tool(output, PDFTOPPM_NOT_FOUND)?;

    let image_path = output_prefix.with_extension("png");
    if image_path.exists() {
        Ok(image_path)
    } else {
        Err(ExtractionError::ExtractionFailed(format!(
            "No image generated for page {}",
            page
        )))
    }
}

/// Parse `pdfinfo` output into a page count and metadata.
pub fn parse_pdfinfo(stdout: &str) -> (Option<u32>, SourceMetadata) {
    let mut page_count = None;
    let mut metadata = SourceMetadata::default();

    for line in stdout.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let field = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };

        match key.trim() {
            "Pages" => page_count = value.parse().ok(),
            "Title" => metadata.title = field,
            "Author" => metadata.author = field,
            "Subject" => metadata.subject = field,
            "Keywords" => metadata.keywords = field,
            "Creator" => metadata.creator = field,
            "Producer" => metadata.producer = field,
            "CreationDate" => metadata.creation_date = field,
            "ModDate" => metadata.modification_date = field,
            "PDF version" => metadata.format = field.map(|v| format!("PDF-{}", v)),
            "Encrypted" => metadata.encrypted = value.starts_with("yes"),
            _ => {}
        }
    }

    (page_count, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDFINFO_SAMPLE: &str = "\
Title:           Quarterly Report
Author:          Finance Team
Creator:         Writer
Producer:        LibreOffice 7.4
CreationDate:    Mon Jan  8 10:12:00 2024 UTC
ModDate:         
Tagged:          no
Encrypted:       no
Pages:           12
Page size:       612 x 792 pts (letter)
PDF version:     1.7
";

    #[test]
    fn test_parse_pdfinfo() {
        let (pages, meta) = parse_pdfinfo(PDFINFO_SAMPLE);
        assert_eq!(pages, Some(12));
        assert_eq!(meta.title.as_deref(), Some("Quarterly Report"));
        assert_eq!(meta.author.as_deref(), Some("Finance Team"));
        assert_eq!(meta.producer.as_deref(), Some("LibreOffice 7.4"));
        assert_eq!(
            meta.creation_date.as_deref(),
            Some("Mon Jan  8 10:12:00 2024 UTC")
        );
        assert_eq!(meta.modification_date, None);
        assert_eq!(meta.subject, None);
        assert_eq!(meta.format.as_deref(), Some("PDF-1.7"));
        assert!(!meta.encrypted);
    }

    #[test]
    fn test_parse_pdfinfo_encrypted_without_pages() {
        let (pages, meta) = parse_pdfinfo("Encrypted:       yes (print:yes copy:no)\n");
        assert_eq!(pages, None);
        assert!(meta.encrypted);
    }

    #[test]
    fn test_scale_to_dpi() {
        assert_eq!(scale_to_dpi(1.0), 72);
        assert_eq!(scale_to_dpi(2.0), 144);
        assert_eq!(scale_to_dpi(0.0), 1);
    }

    #[test]
    fn test_open_rejects_garbage() {
        if !super::super::tools::check_binary("pdfinfo") {
            return;
        }
        let err = PopplerBackend::new().open(b"definitely not a pdf").err().unwrap();
        assert!(matches!(err, ExtractionError::DocumentOpen(_)), "{:?}", err);
    }
}
