//! Session-scoped state: running counters and the accumulated page store.
//!
//! A [`Session`] is an explicit value owned by the orchestrator. It starts
//! all-zero, grows as batches are processed, and only [`Session::reset`]
//! shrinks it.

use crate::output::{ConversionOutcome, DocumentStatus, RenderedPage};
use serde::Serialize;

/// Running per-document counters.
///
/// `total` always equals `succeeded + failed + skipped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total: usize,
}

impl Summary {
    fn record(&mut self, status: DocumentStatus) {
        match status {
            DocumentStatus::Converted => self.succeeded += 1,
            DocumentStatus::Failed => self.failed += 1,
            DocumentStatus::Skipped => self.skipped += 1,
        }
        self.total = self.succeeded + self.failed + self.skipped;
    }
}

/// Insertion-ordered pages from every successful conversion in the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultStore {
    pages: Vec<RenderedPage>,
}

impl ResultStore {
    pub fn pages(&self) -> &[RenderedPage] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn extend(&mut self, pages: Vec<RenderedPage>) {
        self.pages.extend(pages);
    }
}

/// Everything that survives between batches.
#[derive(Debug, Default)]
pub struct Session {
    summary: Summary,
    store: ResultStore,
    upload_generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Identity of the current upload interaction.
    ///
    /// Bumped on every reset so an upload widget keyed on it starts fresh.
    pub fn upload_generation(&self) -> u64 {
        self.upload_generation
    }

    /// Fold one document outcome into the counters and the store.
    pub(crate) fn record(&mut self, outcome: ConversionOutcome) {
        self.summary.record(outcome.status());
        if let ConversionOutcome::Success(pages) = outcome {
            self.store.extend(pages);
        }
    }

    /// Clear the store, zero the counters, and start a new upload generation.
    pub fn reset(&mut self) {
        self.summary = Summary::default();
        self.store = ResultStore::default();
        self.upload_generation = self.upload_generation.wrapping_add(1);
    }
}
