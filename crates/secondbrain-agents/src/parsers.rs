//! File parsers: file-type sniffing, text decoding, PDF page extraction.

use secondbrain_core::FileKind;

use crate::error::{AgentError, Result};

/// `Pdf` if the bytes carry the PDF magic or the filename ends in `.pdf`.
pub fn detect_file_kind(bytes: &[u8], filename: &str) -> FileKind {
    if bytes.starts_with(b"%PDF") || filename.to_lowercase().ends_with(".pdf") {
        FileKind::Pdf
    } else {
        FileKind::Text
    }
}

/// Decode bytes as UTF-8, replacing invalid sequences. Always one element.
pub fn parse_text_bytes(bytes: &[u8]) -> Vec<String> {
    vec![String::from_utf8_lossy(bytes).into_owned()]
}

/// Extract one string per page, in page order.
#[cfg(feature = "pdf")]
pub fn parse_pdf_bytes(bytes: &[u8]) -> Result<Vec<String>> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| AgentError::Parse {
        kind: "pdf".to_string(),
        reason: e.to_string(),
    })
}

#[cfg(not(feature = "pdf"))]
pub fn parse_pdf_bytes(_bytes: &[u8]) -> Result<Vec<String>> {
    Err(AgentError::Parse {
        kind: "pdf".to_string(),
        reason: "built without the `pdf` feature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_pdf_by_magic() {
        assert_eq!(detect_file_kind(b"%PDF-1.7\n...", "upload"), FileKind::Pdf);
    }

    #[test]
    fn detects_pdf_by_extension() {
        assert_eq!(detect_file_kind(b"not really", "Report.PDF"), FileKind::Pdf);
    }

    #[test]
    fn everything_else_is_text() {
        assert_eq!(detect_file_kind(b"hello", "notes.md"), FileKind::Text);
        assert_eq!(detect_file_kind(b"", ""), FileKind::Text);
    }

    #[test]
    fn text_decoding_replaces_invalid_utf8() {
        let texts = parse_text_bytes(b"caf\xc3\xa9 \xff ok");
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0], "café \u{FFFD} ok");
    }
}
