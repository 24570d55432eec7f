//! Batch orchestration: fold a batch of uploads into session state.
//!
//! [`BatchOrchestrator`] owns the [`Session`] and is the only thing that
//! mutates it. Every document yields exactly one [`ConversionOutcome`], one
//! counter increment, and one [`DocumentReport`]; nothing that goes wrong
//! inside a document stops the rest of the batch.

use crate::archive;
use crate::config::ConversionConfig;
use crate::error::{DocumentError, Pdf2JpegError};
use crate::output::{ConversionOutcome, Document, DocumentReport, RenderedPage};
use crate::pipeline::backend::{PdfBackend, PdfiumBackend};
use crate::pipeline::classify::{classify, Classification};
use crate::pipeline::render::render_document;
use crate::pipeline::retry::{Sleeper, ThreadSleeper};
use crate::session::{Session, Summary};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Drives classification and rendering over batches of uploads.
pub struct BatchOrchestrator {
    backend: Arc<dyn PdfBackend>,
    sleeper: Arc<dyn Sleeper>,
    config: ConversionConfig,
    session: Session,
}

impl BatchOrchestrator {
    /// Orchestrator over an explicit backend, sleeping with `std::thread::sleep`.
    pub fn new(backend: Arc<dyn PdfBackend>, config: ConversionConfig) -> Self {
        Self {
            backend,
            sleeper: Arc::new(ThreadSleeper),
            config,
            session: Session::new(),
        }
    }

    /// Orchestrator over pdfium, located via `PDFIUM_LIB_PATH` or the system
    /// library path.
    pub fn with_pdfium(config: ConversionConfig) -> Result<Self, Pdf2JpegError> {
        Ok(Self::new(Arc::new(PdfiumBackend::new()?), config))
    }

    /// Replace the sleeper used between render attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn summary(&self) -> &Summary {
        self.session.summary()
    }

    /// Every page converted since the last reset, in conversion order.
    pub fn results(&self) -> &[RenderedPage] {
        self.session.store().pages()
    }

    pub fn upload_generation(&self) -> u64 {
        self.session.upload_generation()
    }

    /// Process `documents` in order, updating the session after each one.
    ///
    /// Never fails: per-document errors become [`ConversionOutcome::Fail`].
    /// Each document is dropped as soon as its outcome is recorded.
    pub fn process_batch(
        &mut self,
        documents: impl IntoIterator<Item = Document>,
    ) -> Vec<DocumentReport> {
        let documents: Vec<Document> = documents.into_iter().collect();
        let total = documents.len();
        let batch_start = Instant::now();
        info!("Starting batch of {} documents", total);

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_start(total);
        }

        let mut reports = Vec::with_capacity(total);
        for (i, document) in documents.into_iter().enumerate() {
            let index = i + 1;
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_document_start(index, total, &document.name);
            }

            let outcome = self.convert_document(&document);
            let report = DocumentReport::new(&document.name, &outcome);
            log_outcome(&document.name, &outcome);
            self.session.record(outcome);

            if let Some(ref cb) = self.config.progress_callback {
                cb.on_document_complete(index, total, &report, self.session.summary());
            }
            reports.push(report);
        }

        let summary = *self.session.summary();
        info!(
            "Batch complete in {}ms: {} converted, {} failed, {} skipped ({} total this session)",
            batch_start.elapsed().as_millis(),
            summary.succeeded,
            summary.failed,
            summary.skipped,
            summary.total
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_complete(&summary);
        }

        reports
    }

    /// Classify, then render when the document is ready.
    pub fn convert_document(&self, document: &Document) -> ConversionOutcome {
        match classify(document, self.backend.as_ref()) {
            Err(e) => ConversionOutcome::Fail(DocumentError::Classification(e)),
            Ok(Classification::Encrypted) => ConversionOutcome::Skip,
            Ok(Classification::Ready) => match render_document(
                document,
                self.backend.as_ref(),
                &self.config,
                self.sleeper.as_ref(),
            ) {
                Ok(pages) => ConversionOutcome::Success(pages),
                Err(e) => ConversionOutcome::Fail(e),
            },
        }
    }

    /// Clear converted pages and counters and start a new upload generation.
    pub fn reset(&mut self) {
        self.session.reset();
        info!(
            "Session reset (upload generation {})",
            self.session.upload_generation()
        );
    }

    /// The session's pages as an in-memory ZIP, or `None` when nothing has
    /// been converted.
    pub fn export_archive(&self) -> Option<Result<Vec<u8>, Pdf2JpegError>> {
        let store = self.session.store();
        if store.is_empty() {
            return None;
        }
        Some(archive::zip_bytes(store.pages()))
    }

    /// Write the session's pages to a ZIP file at `path`.
    pub fn export_archive_to(&self, path: impl AsRef<Path>) -> Result<(), Pdf2JpegError> {
        let store = self.session.store();
        if store.is_empty() {
            return Err(Pdf2JpegError::EmptyResultStore);
        }
        archive::write_zip_file(store.pages(), path)
    }
}

fn log_outcome(name: &str, outcome: &ConversionOutcome) {
    match outcome {
        ConversionOutcome::Success(pages) => info!("Converted: {} ({} pages)", name, pages.len()),
        ConversionOutcome::Skip => warn!("Skipped (password protected): {}", name),
        ConversionOutcome::Fail(e) => error!("Failed: {} — {}", name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::pipeline::backend::{OpenError, PageSink, RasterOptions};
    use image::{DynamicImage, RgbImage};
    use std::time::Duration;

    /// Every document opens with two pages and renders fine.
    struct TwoPages;

    impl PdfBackend for TwoPages {
        fn open(&self, _bytes: &[u8]) -> Result<usize, OpenError> {
            Ok(2)
        }

        fn rasterise(
            &self,
            _bytes: &[u8],
            _options: &RasterOptions,
            sink: &mut PageSink<'_>,
        ) -> Result<usize, RenderError> {
            for page in 1..=2 {
                sink(page, DynamicImage::ImageRgb8(RgbImage::new(2, 2)))?;
            }
            Ok(2)
        }
    }

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _duration: Duration) {}
    }

    fn orchestrator() -> BatchOrchestrator {
        BatchOrchestrator::new(Arc::new(TwoPages), ConversionConfig::default())
            .with_sleeper(Arc::new(NoSleep))
    }

    #[test]
    fn garbage_upload_fails_without_aborting_batch() {
        let mut o = orchestrator();
        let reports = o.process_batch(vec![
            Document::new("junk.pdf", b"hello".to_vec()),
            Document::new("good.pdf", b"%PDF-1.4".to_vec()),
        ]);
        assert_eq!(reports.len(), 2);
        let s = o.summary();
        assert_eq!((s.failed, s.succeeded, s.total), (1, 1, 2));
        assert_eq!(o.results().len(), 2);
    }

    #[test]
    fn export_is_unavailable_until_something_converts() {
        let mut o = orchestrator();
        assert!(o.export_archive().is_none());
        o.process_batch(vec![Document::new("a.pdf", b"%PDF".to_vec())]);
        let zip = o.export_archive().expect("store non-empty").unwrap();
        assert!(zip.starts_with(b"PK"));
    }

    #[test]
    fn export_to_file_refuses_empty_store() {
        let o = orchestrator();
        let dir = tempfile::tempdir().unwrap();
        let err = o.export_archive_to(dir.path().join("out.zip")).unwrap_err();
        assert!(matches!(err, Pdf2JpegError::EmptyResultStore));
    }

    #[test]
    fn summary_accumulates_across_batches() {
        let mut o = orchestrator();
        o.process_batch(vec![Document::new("a.pdf", b"%PDF".to_vec())]);
        o.process_batch(vec![Document::new("b.pdf", b"%PDF".to_vec())]);
        assert_eq!(o.summary().total, 2);
        let names: Vec<&str> = o.results().iter().map(|p| p.output_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpeg", "a_2.jpeg", "b.jpeg", "b_2.jpeg"]);
    }
}
