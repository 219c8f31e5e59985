//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line for text extraction.

use std::path::Path;
use std::process::Command;

use image::GrayImage;
use tempfile::TempDir;

use super::backend::{OcrBackend, OcrConfig, OcrError};
use super::tools::{check_binary, classify_output, CommandOutcome, TESSERACT_NOT_FOUND};

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Arguments following the input and output operands.
    fn engine_args(&self, language: &str) -> Vec<String> {
        let mut args = vec![
            "-l".to_string(),
            language.to_string(),
            "--psm".to_string(),
            self.config.page_segmentation_mode.to_string(),
        ];
        if let Some(ref dir) = self.config.tessdata_dir {
            args.push("--tessdata-dir".to_string());
            args.push(dir.display().to_string());
        }
        args
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path, language: &str) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(self.engine_args(language))
            .output();

        match classify_output(output) {
            CommandOutcome::Success(text) => Ok(text),
            CommandOutcome::Failed(stderr) => {
                Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr)))
            }
            CommandOutcome::NotFound => Err(OcrError::BackendNotAvailable(
                TESSERACT_NOT_FOUND.to_string(),
            )),
            CommandOutcome::Io(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if !check_binary("tesseract") {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        } else {
            "Tesseract is available".to_string()
        }
    }

    fn run_ocr(&self, image: &GrayImage, language: &str) -> Result<String, OcrError> {
        let temp_dir = TempDir::new()?;
        let image_path = temp_dir.path().join("page.png");
        image
            .save(&image_path)
            .map_err(|e| OcrError::ImageError(e.to_string()))?;

        self.run_tesseract(&image_path, language)
    }
}
