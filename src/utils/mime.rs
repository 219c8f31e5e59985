//! Content sniffing and declared-format checks.

use crate::models::DocumentFormat;

/// MIME type detected from magic bytes, if any.
pub fn sniff_mime(content: &[u8]) -> Option<&'static str> {
    infer::get(content).map(|kind| kind.mime_type())
}

/// How a document's content relates to its declared format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCheck {
    /// Magic bytes agree with the declared format.
    Matches,
    /// Magic bytes identify a different type.
    Mismatch { detected: &'static str },
    /// Nothing recognizable in the content.
    Unknown,
}

/// Compare the declared format with what the bytes look like.
///
/// Extraction still follows the declared format; a mismatch usually ends in a
/// document open failure and is worth a log line before that happens.
pub fn check_declared_format(declared: DocumentFormat, content: &[u8]) -> FormatCheck {
    match sniff_mime(content) {
        None => FormatCheck::Unknown,
        Some(mime) if DocumentFormat::from_mime(mime) == Some(declared) => FormatCheck::Matches,
        Some(mime) => FormatCheck::Mismatch { detected: mime },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(b"%PDF-1.4\n%"), Some("application/pdf"));
        assert_eq!(sniff_mime(PNG_MAGIC), Some("image/png"));
        assert_eq!(sniff_mime(b"plain words"), None);
    }

    #[test]
    fn test_check_declared_format() {
        assert_eq!(
            check_declared_format(DocumentFormat::Pdf, b"%PDF-1.4\n%"),
            FormatCheck::Matches
        );
        assert_eq!(
            check_declared_format(DocumentFormat::Pdf, PNG_MAGIC),
            FormatCheck::Mismatch {
                detected: "image/png"
            }
        );
        assert_eq!(
            check_declared_format(DocumentFormat::Png, b"not an image"),
            FormatCheck::Unknown
        );
    }
}
