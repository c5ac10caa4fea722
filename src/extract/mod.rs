//! Text extraction from uploaded study documents.
//!
//! This module provides:
//! * [`DocumentKind`] — the closed set of supported document formats,
//!   resolved once from the filename suffix at upload time.
//! * [`UploadedDocument`] — a transient (name, bytes, kind) triple consumed
//!   exactly once during a save action.
//! * [`extract`] — format dispatch to the PDF / slide extractors.
//! * [`ExtractError`] — error variants for extraction failures.
//!
//! Extraction is a pure function of the document bytes; a file that cannot
//! be parsed as its declared format propagates an error and aborts the
//! whole save batch.

pub mod pdf;
pub mod slides;

use std::path::Path;

use thiserror::Error;

// ---------------------------------------------------------------------------
// ExtractError
// ---------------------------------------------------------------------------

/// Errors that can occur while reading or extracting a document.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The bytes could not be parsed as a PDF document.
    #[error("PDF could not be read: {0}")]
    Pdf(String),

    /// The bytes could not be parsed as a PPTX presentation.
    #[error("presentation could not be read: {0}")]
    Slides(String),

    /// The file could not be read from disk.
    #[error("file could not be read: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        ExtractError::Io(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// DocumentKind
// ---------------------------------------------------------------------------

/// The closed set of document formats the app can extract text from.
///
/// Resolved once per file via [`DocumentKind::from_name`]; a `None` result
/// means the file is unsupported and the save action reports it as skipped
/// instead of extracting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// A paged PDF document (`.pdf`).
    Pdf,
    /// A PowerPoint slide deck (`.pptx`).
    Slides,
}

impl DocumentKind {
    /// Resolve the kind from a filename suffix (ASCII case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let extension = Path::new(name).extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "pptx" => Some(DocumentKind::Slides),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// UploadedDocument
// ---------------------------------------------------------------------------

/// An uploaded file on its way into a subject: consumed once by
/// [`extract`], never retained afterwards.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Original filename, used for the material header line.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Format resolved from the filename at upload time.
    pub kind: DocumentKind,
}

/// Extract the plain-text content of `document`.
pub fn extract(document: &UploadedDocument) -> Result<String, ExtractError> {
    match document.kind {
        DocumentKind::Pdf => pdf::extract_text(&document.bytes),
        DocumentKind::Slides => slides::extract_text(&document.bytes),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_resolves_pdf_and_pptx() {
        assert_eq!(DocumentKind::from_name("notes.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::from_name("lecture.pptx"),
            Some(DocumentKind::Slides)
        );
    }

    #[test]
    fn kind_is_case_insensitive() {
        assert_eq!(DocumentKind::from_name("NOTES.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::from_name("Lecture.PpTx"),
            Some(DocumentKind::Slides)
        );
    }

    #[test]
    fn unsupported_suffixes_resolve_to_none() {
        assert_eq!(DocumentKind::from_name("image.png"), None);
        assert_eq!(DocumentKind::from_name("essay.docx"), None);
        assert_eq!(DocumentKind::from_name("no_extension"), None);
        assert_eq!(DocumentKind::from_name(""), None);
    }

    /// `.pdf` must be a suffix, not a substring.
    #[test]
    fn suffix_only_counts_at_the_end() {
        assert_eq!(DocumentKind::from_name("report.pdf.txt"), None);
    }

    #[test]
    fn extract_dispatches_on_kind() {
        let garbage = UploadedDocument {
            name: "x.pdf".into(),
            bytes: b"not a pdf at all".to_vec(),
            kind: DocumentKind::Pdf,
        };
        assert!(matches!(extract(&garbage), Err(ExtractError::Pdf(_))));

        let garbage = UploadedDocument {
            name: "x.pptx".into(),
            bytes: b"not a zip archive".to_vec(),
            kind: DocumentKind::Slides,
        };
        assert!(matches!(extract(&garbage), Err(ExtractError::Slides(_))));
    }
}
