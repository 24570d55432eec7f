//! Error types for the pdf2jpeg library.
//!
//! Two layers of errors reflect two distinct failure modes:
//!
//! * [`Pdf2JpegError`] — **Fatal**: the operation cannot proceed at all
//!   (pdfium could not be bound, the configuration is invalid, the archive
//!   could not be written). Returned as `Err(Pdf2JpegError)`.
//!
//! * [`DocumentError`] — **Per-document**: one uploaded document could not be
//!   converted. It never escapes [`crate::batch::BatchOrchestrator::process_batch`];
//!   it is carried inside [`crate::output::ConversionOutcome::Fail`] so the
//!   rest of the batch keeps going.
//!
//! [`ClassificationError`] and [`RenderError`] are the two causes a
//! `DocumentError` can wrap. Classification errors are permanent and never
//! retried; render errors are treated as transient and retried by
//! [`crate::pipeline::retry::RetryPolicy`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2jpeg library.
#[derive(Debug, Error)]
pub enum Pdf2JpegError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Export was requested but no page has been converted yet.
    #[error("Nothing to export: no pages have been converted in this session")]
    EmptyResultStore,

    /// The ZIP container could not be assembled.
    #[error("Failed to build archive: {0}")]
    ArchiveWriteFailed(#[from] zip::result::ZipError),

    /// Could not create or write the output archive file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium to use a specific copy, or install\n\
pdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),
}

/// Why a document could not even be inspected.
///
/// A structurally invalid document never becomes valid on a second look, so
/// these are permanent and map straight to a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
pub enum ClassificationError {
    /// The uploaded blob has no bytes.
    #[error("document is empty")]
    Empty,

    /// The blob does not start with the `%PDF` signature.
    #[error("not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// The backend could not parse the document structure.
    #[error("document is corrupt or unreadable: {0}")]
    Unreadable(String),
}

/// A failed render attempt.
///
/// Treated as transient: the whole attempt is thrown away and retried.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
pub enum RenderError {
    /// The backend could not reopen the document for rendering.
    #[error("could not open document for rendering: {0}")]
    Open(String),

    /// pdfium failed to rasterise a page.
    #[error("rasterisation failed for page {page}: {detail}")]
    Rasterisation { page: usize, detail: String },

    /// The rendered image could not be JPEG-encoded.
    #[error("JPEG encoding failed for page {page}: {detail}")]
    Encode { page: usize, detail: String },

    /// The document opened but has no pages to emit.
    #[error("document has no pages")]
    NoPages,
}

/// Why a single document ended up as a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
pub enum DocumentError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    /// Every render attempt failed.
    #[error("rendering failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: RenderError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_exhausted_display() {
        let e = DocumentError::RetriesExhausted {
            attempts: 3,
            last_error: RenderError::Rasterisation {
                page: 2,
                detail: "bitmap alloc".into(),
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("3 attempts"), "got: {msg}");
        assert!(msg.contains("page 2"), "got: {msg}");
    }

    #[test]
    fn classification_error_is_transparent() {
        let e: DocumentError = ClassificationError::Unreadable("bad xref".into()).into();
        assert_eq!(e.to_string(), "document is corrupt or unreadable: bad xref");
    }

    #[test]
    fn not_a_pdf_display_shows_magic() {
        let e = ClassificationError::NotAPdf {
            magic: b"PK\x03\x04".to_vec(),
        };
        assert!(e.to_string().contains("80, 75"));
    }

    #[test]
    fn output_write_failed_display() {
        let e = Pdf2JpegError::OutputWriteFailed {
            path: PathBuf::from("/tmp/out.zip"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/tmp/out.zip"));
    }
}
