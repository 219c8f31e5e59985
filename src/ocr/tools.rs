//! Helpers for the external command-line tools OCR depends on.

use std::process::Output;

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

pub const TESSERACT_NOT_FOUND: &str = "tesseract not found (install tesseract-ocr)";
pub const PDFTOPPM_NOT_FOUND: &str = "pdftoppm not found (install poppler-utils)";
pub const PDFTOTEXT_NOT_FOUND: &str = "pdftotext not found (install poppler-utils)";
pub const PDFINFO_NOT_FOUND: &str = "pdfinfo not found (install poppler-utils)";

/// Tools the default backends shell out to.
pub const REQUIRED_TOOLS: &[&str] = &["pdfinfo", "pdftotext", "pdftoppm", "tesseract"];

/// Availability of each required tool.
pub fn check_tools() -> Vec<(String, bool)> {
    REQUIRED_TOOLS
        .iter()
        .map(|tool| (tool.to_string(), check_binary(tool)))
        .collect()
}

/// Outcome of running a tool, before mapping into a caller's error type.
pub enum CommandOutcome {
    Success(String),
    Failed(String),
    NotFound,
    Io(std::io::Error),
}

/// Classify a finished command: stdout on success, stderr on failure.
pub fn classify_output(result: std::io::Result<Output>) -> CommandOutcome {
    match result {
        Ok(output) if output.status.success() => {
            CommandOutcome::Success(String::from_utf8_lossy(&output.stdout).to_string())
        }
        Ok(output) => {
            CommandOutcome::Failed(String::from_utf8_lossy(&output.stderr).trim().to_string())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CommandOutcome::NotFound,
        Err(e) => CommandOutcome::Io(e),
    }
}
