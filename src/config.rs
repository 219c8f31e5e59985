//! Configuration: extraction policy and application settings.
//!
//! Settings come from a TOML file, either passed explicitly or discovered as
//! `docsift.toml` in the data directory, with environment overrides on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::OcrConfig;

/// Default database filename inside the data directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "docsift.db";

/// Config filename looked up in the data directory.
pub const CONFIG_FILENAME: &str = "docsift.toml";

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Per-request extraction policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// OCR language codes joined with `+`.
    pub language: String,
    /// Replace short embedded PDF text with OCR output.
    pub ocr_enabled: bool,
    /// Run table detection on each page.
    pub tables_enabled: bool,
    /// Stripped embedded-text length below which a PDF page is OCRed.
    pub ocr_min_chars: usize,
    /// Linear rasterization scale relative to the page's native resolution.
    pub raster_scale: f32,
    /// Tesseract page segmentation mode.
    pub page_segmentation_mode: u8,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            language: "eng+ara".to_string(),
            ocr_enabled: true,
            tables_enabled: true,
            ocr_min_chars: 50,
            raster_scale: 2.0,
            page_segmentation_mode: 3,
        }
    }
}

impl ExtractionConfig {
    /// Check values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.language.trim().is_empty()
            || self.language.split('+').any(|code| code.trim().is_empty())
        {
            return Err(ConfigError::Invalid {
                key: "language",
                reason: format!("'{}' is not a '+'-joined list of codes", self.language),
            });
        }
        if !(self.raster_scale.is_finite() && self.raster_scale > 0.0) {
            return Err(ConfigError::Invalid {
                key: "raster_scale",
                reason: format!("{} must be a positive number", self.raster_scale),
            });
        }
        if self.page_segmentation_mode > 13 {
            return Err(ConfigError::Invalid {
                key: "page_segmentation_mode",
                reason: format!("{} is outside 0-13", self.page_segmentation_mode),
            });
        }
        Ok(())
    }

    /// Engine settings for the OCR backend.
    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig {
            page_segmentation_mode: self.page_segmentation_mode,
            ..OcrConfig::default()
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Abandon a document after this many seconds.
    pub timeout_secs: Option<u64>,
    /// Override for the tessdata directory.
    pub tessdata_dir: Option<PathBuf>,
    pub extraction: ExtractionConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // Data dir -> Home dir -> Current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docsift");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            timeout_secs: None,
            tessdata_dir: None,
            extraction: ExtractionConfig::default(),
        }
    }
}

impl Settings {
    /// Settings rooted at a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Full path of the history database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Engine settings for the OCR backend.
    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig {
            tessdata_dir: self.tessdata_dir.clone(),
            ..self.extraction.ocr_config()
        }
    }

    /// Parse settings from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, `docsift.toml` in the data
    /// directory is used if present, otherwise defaults. `DOCSIFT_DATA_DIR`
    /// and `DOCSIFT_LANGUAGE` override the file.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let data_dir_env = std::env::var("DOCSIFT_DATA_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let discovered = data_dir_env
            .clone()
            .unwrap_or_else(|| Settings::default().data_dir)
            .join(CONFIG_FILENAME);

        let mut settings = match config_path {
            Some(path) => Self::read_file(path)?,
            None if discovered.exists() => Self::read_file(&discovered)?,
            None => Self::default(),
        };

        if let Some(dir) = data_dir_env {
            settings.data_dir = dir;
        }
        if let Some(lang) = std::env::var("DOCSIFT_LANGUAGE")
            .ok()
            .filter(|s| !s.is_empty())
        {
            settings.extraction.language = lang;
        }

        settings.extraction.validate()?;
        Ok(settings)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }
}
