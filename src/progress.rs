//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! one event per document as the orchestrator works through a batch. The
//! presentation layer (a terminal bar, a web UI) lives entirely on the other
//! side of this trait.
//!
//! # Example
//!
//! ```rust
//! use pdf2jpeg::{BatchProgressCallback, ConversionConfig, DocumentReport, Summary};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_document_complete(
//!         &self,
//!         index: usize,
//!         total: usize,
//!         report: &DocumentReport,
//!         summary: &Summary,
//!     ) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!(
//!             "{}/{} {}: {:?} ({} this session)",
//!             index, total, report.name, report.status, summary.total
//!         );
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::DocumentReport;
use crate::session::Summary;
use std::sync::Arc;

/// Called by the orchestrator as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Documents are processed one at a time, but the trait
/// is `Send + Sync` so an orchestrator can live on a worker thread.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first document of a batch.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called before a document is classified.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the batch
    /// * `total` — documents in the batch
    /// * `name`  — original upload name
    fn on_document_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called after the document's outcome has been recorded in the session.
    ///
    /// `summary` is the session-wide counters including this document.
    fn on_document_complete(
        &self,
        index: usize,
        total: usize,
        report: &DocumentReport,
        summary: &Summary,
    ) {
        let _ = (index, total, report, summary);
    }

    /// Called once after the whole batch, with the session-wide counters.
    fn on_batch_complete(&self, summary: &Summary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
