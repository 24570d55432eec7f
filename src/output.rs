//! Input and output value types: uploaded documents, rendered pages, and the
//! per-document outcome.

use crate::error::DocumentError;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Stem used when an upload name has no usable file stem.
const FALLBACK_BASE_NAME: &str = "document";

/// An uploaded document, fully read into memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    /// Original upload name, e.g. `report.pdf`.
    pub name: String,
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// The name outputs are derived from: the final path component with its
    /// last extension removed.
    ///
    /// ```rust
    /// use pdf2jpeg::Document;
    ///
    /// assert_eq!(Document::new("uploads/q3.v2.pdf", vec![]).base_name(), "q3.v2");
    /// assert_eq!(Document::new("notes", vec![]).base_name(), "notes");
    /// ```
    pub fn base_name(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// Output file name for a 1-indexed page of a document with the given base name.
///
/// Page 1 carries no suffix; later pages get `_<page>`.
pub fn page_output_name(base_name: &str, page_num: usize) -> String {
    if page_num <= 1 {
        format!("{base_name}.jpeg")
    } else {
        format!("{base_name}_{page_num}.jpeg")
    }
}

/// One JPEG-encoded page, ready for export.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub output_name: String,
    pub jpeg_bytes: Vec<u8>,
}

impl fmt::Debug for RenderedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedPage")
            .field("output_name", &self.output_name)
            .field("jpeg_bytes", &format_args!("<{} bytes>", self.jpeg_bytes.len()))
            .finish()
    }
}

/// Result of processing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Every page converted, in page order.
    Success(Vec<RenderedPage>),
    /// Encrypted; needs a password, so it was left alone.
    Skip,
    /// Corrupt, unreadable, or every render attempt failed.
    Fail(DocumentError),
}

impl ConversionOutcome {
    pub fn status(&self) -> DocumentStatus {
        match self {
            ConversionOutcome::Success(_) => DocumentStatus::Converted,
            ConversionOutcome::Skip => DocumentStatus::Skipped,
            ConversionOutcome::Fail(_) => DocumentStatus::Failed,
        }
    }
}

/// Outcome tag without the payload, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Converted,
    Skipped,
    Failed,
}

/// What happened to one document of a batch.
///
/// Exactly one report is produced per document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    /// Original upload name.
    pub name: String,
    pub status: DocumentStatus,
    /// Pages added to the result store (0 unless converted).
    pub pages: usize,
    /// Failure cause, when the document failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DocumentReport {
    pub(crate) fn new(name: &str, outcome: &ConversionOutcome) -> Self {
        let (pages, detail) = match outcome {
            ConversionOutcome::Success(pages) => (pages.len(), None),
            ConversionOutcome::Skip => (0, None),
            ConversionOutcome::Fail(e) => (0, Some(e.to_string())),
        };
        Self {
            name: name.to_string(),
            status: outcome.status(),
            pages,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassificationError;

    #[test]
    fn output_names_follow_page_numbering() {
        assert_eq!(page_output_name("a", 1), "a.jpeg");
        assert_eq!(page_output_name("a", 2), "a_2.jpeg");
        assert_eq!(page_output_name("a", 12), "a_12.jpeg");
    }

    #[test]
    fn base_name_strips_directory_and_last_extension() {
        assert_eq!(Document::new("a.pdf", vec![]).base_name(), "a");
        assert_eq!(Document::new("a.PDF", vec![]).base_name(), "a");
        assert_eq!(Document::new("dir/sub/scan.final.pdf", vec![]).base_name(), "scan.final");
        assert_eq!(Document::new(".hidden", vec![]).base_name(), ".hidden");
    }

    #[test]
    fn base_name_falls_back_when_empty() {
        assert_eq!(Document::new("", vec![]).base_name(), "document");
        assert_eq!(Document::new("..", vec![]).base_name(), "document");
    }

    #[test]
    fn debug_does_not_dump_bytes() {
        let d = Document::new("a.pdf", vec![0u8; 4096]);
        let s = format!("{d:?}");
        assert!(s.contains("<4096 bytes>"), "got: {s}");
    }

    #[test]
    fn report_carries_failure_detail() {
        let outcome = ConversionOutcome::Fail(ClassificationError::Empty.into());
        let report = DocumentReport::new("c.pdf", &outcome);
        assert_eq!(report.status, DocumentStatus::Failed);
        assert_eq!(report.pages, 0);
        assert_eq!(report.detail.as_deref(), Some("document is empty"));
    }

    #[test]
    fn report_serialises_status_in_snake_case() {
        let report = DocumentReport {
            name: "b.pdf".into(),
            status: DocumentStatus::Skipped,
            pages: 0,
            detail: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"name":"b.pdf","status":"skipped","pages":0}"#);
    }
}
