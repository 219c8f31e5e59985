//! Raw document input and its declared format.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ocr::ExtractionError;

use super::fingerprint::ContentFingerprint;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Png,
    Jpeg,
    Webp,
    Bmp,
    Tiff,
}

impl DocumentFormat {
    /// File extensions accepted at the input boundary.
    pub const SUPPORTED_EXTENSIONS: &'static [&'static str] =
        &["pdf", "png", "jpg", "jpeg", "webp", "bmp", "tiff"];

    /// Parse a declared format tag or file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            "bmp" => Some(Self::Bmp),
            "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Parse a MIME type such as `application/pdf` or `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            "image/tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Detect the format from magic bytes.
    pub fn sniff(content: &[u8]) -> Option<Self> {
        infer::get(content).and_then(|kind| Self::from_mime(kind.mime_type()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }

    /// Raster formats have no embedded text layer.
    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Pdf)
    }

    /// Decoder hint for the `image` crate.
    pub fn image_format(&self) -> Option<image::ImageFormat> {
        match self {
            Self::Pdf => None,
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Webp => Some(image::ImageFormat::WebP),
            Self::Bmp => Some(image::ImageFormat::Bmp),
            Self::Tiff => Some(image::ImageFormat::Tiff),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document bytes as received at the input boundary.
///
/// Immutable once built; the pipeline consumes it by reference and only the
/// fingerprint outlives extraction.
#[derive(Debug, Clone)]
pub struct RawDocument {
    content: Vec<u8>,
    format: DocumentFormat,
    filename: String,
}

impl RawDocument {
    pub fn new(content: Vec<u8>, format: DocumentFormat, filename: impl Into<String>) -> Self {
        Self {
            content,
            format,
            filename: filename.into(),
        }
    }

    /// Build a document from bytes and a declared format tag.
    pub fn with_declared_format(
        content: Vec<u8>,
        declared: &str,
        filename: impl Into<String>,
    ) -> Result<Self, ExtractionError> {
        let format = DocumentFormat::from_extension(declared)
            .or_else(|| DocumentFormat::from_mime(declared))
            .ok_or_else(|| ExtractionError::UnsupportedFormat(declared.to_string()))?;
        Ok(Self::new(content, format, filename))
    }

    /// Read a file, taking the format from its extension or, failing that, its content.
    pub fn load(path: &Path) -> Result<Self, ExtractionError> {
        let content = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        let format = match path.extension().map(|e| e.to_string_lossy().to_string()) {
            Some(ext) => DocumentFormat::from_extension(&ext)
                .ok_or(ExtractionError::UnsupportedFormat(ext))?,
            None => DocumentFormat::sniff(&content).ok_or_else(|| {
                ExtractionError::UnsupportedFormat(format!("{} (unrecognized content)", filename))
            })?,
        };

        Ok(Self::new(content, format, filename))
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn byte_size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn fingerprint(&self) -> ContentFingerprint {
        ContentFingerprint::compute(&self.content)
    }
}
