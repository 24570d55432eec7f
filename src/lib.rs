//! # pdf2jpeg
//!
//! Batch-convert PDF documents into per-page JPEG images.
//!
//! Each uploaded document is classified (encrypted, readable, or broken),
//! readable ones are rasterised with pdfium and JPEG-encoded under a bounded
//! retry policy, and every converted page accumulates in a session that can
//! be exported as a single ZIP archive.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Document (name, bytes)
//!  │
//!  ├─ 1. Classify  %PDF signature, then pdfium open → Encrypted | Ready | error
//!  ├─ 2. Render    all pages at 200 DPI, whole pass retried (3 × , 2 s apart)
//!  ├─ 3. Encode    RGBA → JPEG, named {base}.jpeg, {base}_2.jpeg, …
//!  ├─ 4. Record    one counter per document, pages appended to the store
//!  └─ 5. Export    ZIP of every page in the store
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2jpeg::{BatchOrchestrator, ConversionConfig, Document};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut orchestrator = BatchOrchestrator::with_pdfium(ConversionConfig::default())?;
//!     let doc = Document::new("report.pdf", std::fs::read("report.pdf")?);
//!     orchestrator.process_batch(vec![doc]);
//!
//!     let s = orchestrator.summary();
//!     eprintln!("{} ok / {} failed / {} skipped", s.succeeded, s.failed, s.skipped);
//!     orchestrator.export_archive_to("converted_pages.zip")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2jpeg` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod archive;
pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::BatchOrchestrator;
pub use config::{ConversionConfig, ConversionConfigBuilder, DEFAULT_ARCHIVE_NAME};
pub use error::{ClassificationError, DocumentError, Pdf2JpegError, RenderError};
pub use output::{ConversionOutcome, Document, DocumentReport, DocumentStatus, RenderedPage};
pub use pipeline::backend::{OpenError, PageSink, PdfBackend, PdfiumBackend, RasterOptions};
pub use pipeline::classify::{classify, Classification};
pub use pipeline::render::render_document;
pub use pipeline::retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{ResultStore, Session, Summary};
