//! Document classification: decide whether an upload can be converted.

use super::backend::{OpenError, PdfBackend};
use crate::error::ClassificationError;
use crate::output::Document;
use tracing::debug;

/// PDF file signature.
const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// What the classifier decided about a readable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Carries encryption, whether or not a password is needed to open it.
    Encrypted,
    /// Readable; hand it to the renderer.
    Ready,
}

/// Inspect `document` without modifying it.
///
/// Signature checks run before the backend is involved so obviously wrong
/// uploads (empty files, images renamed to `.pdf`) never reach pdfium.
pub fn classify(
    document: &Document,
    backend: &dyn PdfBackend,
) -> Result<Classification, ClassificationError> {
    let bytes = &document.bytes;
    if bytes.is_empty() {
        return Err(ClassificationError::Empty);
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ClassificationError::NotAPdf {
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        });
    }

    match backend.open(bytes) {
        Ok(page_count) => {
            debug!("{}: readable, {} pages", document.name, page_count);
            Ok(Classification::Ready)
        }
        Err(OpenError::PasswordRequired | OpenError::Encrypted) => {
            debug!("{}: encrypted", document.name);
            Ok(Classification::Encrypted)
        }
        Err(OpenError::Unreadable(detail)) => Err(ClassificationError::Unreadable(detail)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::pipeline::backend::{PageSink, RasterOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedOpen {
        result: Result<usize, OpenError>,
        calls: AtomicUsize,
    }

    impl FixedOpen {
        fn new(result: Result<usize, OpenError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PdfBackend for FixedOpen {
        fn open(&self, _bytes: &[u8]) -> Result<usize, OpenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }

        fn rasterise(
            &self,
            _bytes: &[u8],
            _options: &RasterOptions,
            _sink: &mut PageSink<'_>,
        ) -> Result<usize, RenderError> {
            unreachable!("classification never renders")
        }
    }

    fn pdf(name: &str) -> Document {
        Document::new(name, b"%PDF-1.7\n...".to_vec())
    }

    #[test]
    fn readable_document_is_ready() {
        let backend = FixedOpen::new(Ok(4));
        assert_eq!(classify(&pdf("a.pdf"), &backend), Ok(Classification::Ready));
    }

    #[test]
    fn password_protected_document_is_encrypted() {
        let backend = FixedOpen::new(Err(OpenError::PasswordRequired));
        assert_eq!(classify(&pdf("b.pdf"), &backend), Ok(Classification::Encrypted));
    }

    #[test]
    fn owner_password_document_is_encrypted() {
        let backend = FixedOpen::new(Err(OpenError::Encrypted));
        assert_eq!(classify(&pdf("owner.pdf"), &backend), Ok(Classification::Encrypted));
    }

    #[test]
    fn parse_failure_is_an_error_not_a_skip() {
        let backend = FixedOpen::new(Err(OpenError::Unreadable("xref broken".into())));
        assert_eq!(
            classify(&pdf("c.pdf"), &backend),
            Err(ClassificationError::Unreadable("xref broken".into()))
        );
    }

    #[test]
    fn empty_upload_never_reaches_backend() {
        let backend = FixedOpen::new(Ok(1));
        let doc = Document::new("empty.pdf", Vec::new());
        assert_eq!(classify(&doc, &backend), Err(ClassificationError::Empty));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn wrong_signature_is_rejected() {
        let backend = FixedOpen::new(Ok(1));
        let doc = Document::new("photo.pdf", b"\x89PNG\r\n".to_vec());
        assert_eq!(
            classify(&doc, &backend),
            Err(ClassificationError::NotAPdf {
                magic: b"\x89PNG".to_vec()
            })
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn classification_leaves_document_untouched() {
        let backend = FixedOpen::new(Ok(1));
        let doc = pdf("a.pdf");
        let before = doc.clone();
        let _ = classify(&doc, &backend);
        assert_eq!(doc, before);
    }
}
