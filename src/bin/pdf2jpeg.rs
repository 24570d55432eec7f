//! CLI binary for pdf2jpeg.
//!
//! A thin shim over the library crate: reads the given PDFs into memory,
//! runs them as one batch, prints one status line per document and the
//! summary counters, then writes the ZIP archive.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2jpeg::{
    BatchOrchestrator, BatchProgressCallback, ConversionConfig, Document, DocumentReport,
    DocumentStatus, ProgressCallback, Summary, DEFAULT_ARCHIVE_NAME,
};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar across the batch, one printed line per finished document.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_document_complete(
        &self,
        _index: usize,
        _total: usize,
        report: &DocumentReport,
        _summary: &Summary,
    ) {
        self.bar.println(status_line(report));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _summary: &Summary) {
        self.bar.finish_and_clear();
    }
}

fn status_line(report: &DocumentReport) -> String {
    match report.status {
        DocumentStatus::Converted => format!(
            "  {} Converted: {}  {}",
            green("✓"),
            report.name,
            dim(&format!("{} pages", report.pages))
        ),
        DocumentStatus::Skipped => format!(
            "  {} Skipped (password protected): {}",
            yellow("⚠"),
            report.name
        ),
        DocumentStatus::Failed => format!(
            "  {} Failed: {}  {}",
            red("✗"),
            report.name,
            red(report.detail.as_deref().unwrap_or("unknown error"))
        ),
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert two files into converted_pages.zip
  pdf2jpeg invoice.pdf scan.pdf

  # Every PDF in a directory, custom archive name
  pdf2jpeg ./inbox -o pages.zip

  # Higher resolution, better JPEG quality
  pdf2jpeg --dpi 300 --quality 90 drawing.pdf

  # Machine-readable summary
  pdf2jpeg --json ./inbox > report.json

OUTPUT NAMING:
  report.pdf (3 pages)  →  report.jpeg, report_2.jpeg, report_3.jpeg

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to the pdfium shared library file
  RUST_LOG          Override log filtering (e.g. pdf2jpeg=debug)
"#;

/// Convert PDF files to per-page JPEG images bundled in a ZIP archive.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2jpeg",
    version,
    about = "Convert PDF files to per-page JPEG images bundled in a ZIP archive",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files, or directories whose *.pdf files are converted.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Archive to write.
    #[arg(short, long, env = "PDF2JPEG_OUTPUT", default_value = DEFAULT_ARCHIVE_NAME)]
    output: PathBuf,

    /// Rendering DPI (72–400).
    #[arg(long, env = "PDF2JPEG_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDF2JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Render attempts per document.
    #[arg(long, env = "PDF2JPEG_MAX_ATTEMPTS", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: u32,

    /// Pause between failed attempts, in milliseconds.
    #[arg(long, env = "PDF2JPEG_RETRY_DELAY_MS", default_value_t = 2000)]
    retry_delay_ms: u64,

    /// Print a JSON report ({summary, documents, unreadable}) to stdout.
    #[arg(long, env = "PDF2JPEG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2JPEG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2JPEG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2JPEG_QUIET")]
    quiet: bool,
}

/// An input file that could not be read from disk.
#[derive(Debug, Serialize)]
struct UnreadableInput {
    path: PathBuf,
    error: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a Summary,
    documents: &'a [DocumentReport],
    #[serde(skip_serializing_if = "no_unreadable")]
    unreadable: &'a [UnreadableInput],
    #[serde(skip_serializing_if = "Option::is_none")]
    archive: Option<&'a Path>,
}

fn no_unreadable(inputs: &&[UnreadableInput]) -> bool {
    inputs.is_empty()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // With the progress bar active the per-document lines carry the
    // feedback; library logs would only tear the bar.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Gather inputs ────────────────────────────────────────────────────
    let paths = expand_inputs(&cli.inputs)?;
    if paths.is_empty() {
        anyhow::bail!("No PDF files found in the given inputs");
    }
    let (documents, unreadable) = read_documents(&paths);
    if documents.is_empty() {
        anyhow::bail!("None of the {} inputs could be read", unreadable.len());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run batch ────────────────────────────────────────────────────────
    let mut orchestrator =
        BatchOrchestrator::with_pdfium(config).context("PDF engine unavailable")?;
    let reports = orchestrator.process_batch(documents);
    let summary = *orchestrator.summary();

    // ── Export ───────────────────────────────────────────────────────────
    let archive = if orchestrator.results().is_empty() {
        None
    } else {
        orchestrator
            .export_archive_to(&cli.output)
            .with_context(|| format!("Failed to write archive {}", cli.output.display()))?;
        Some(cli.output.as_path())
    };

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&JsonReport {
            summary: &summary,
            documents: &reports,
            unreadable: &unreadable,
            archive,
        })
        .context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        for input in &unreadable {
            eprintln!(
                "  {} Unreadable: {}  {}",
                red("✗"),
                input.path.display(),
                red(&input.error)
            );
        }
        if !show_progress {
            for report in &reports {
                eprintln!("{}", status_line(report));
            }
        }
        print_summary(&summary);
        match archive {
            Some(path) => eprintln!(
                "{} {} pages  →  {}",
                green("✔"),
                orchestrator.results().len(),
                bold(&path.display().to_string())
            ),
            None => eprintln!("{}", dim("No pages converted; no archive written.")),
        }
    }

    Ok(())
}

fn print_summary(summary: &Summary) {
    eprintln!();
    eprintln!("{}", bold("Summary"));
    eprintln!("  {} Converted : {}", green("✓"), summary.succeeded);
    eprintln!("  {} Failed    : {}", red("✗"), summary.failed);
    eprintln!("  {} Skipped   : {}", yellow("⚠"), summary.skipped);
    eprintln!("    Total     : {}", summary.total);
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .jpeg_quality(cli.quality)
        .max_attempts(cli.max_attempts)
        .retry_delay_ms(cli.retry_delay_ms);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Expand directories to their `*.pdf` entries (sorted); keep files as given.
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)
                .with_context(|| format!("Failed to list {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_pdf_path(p))
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Read every input; files that cannot be read are logged and set aside so
/// the rest of the batch still runs.
fn read_documents(paths: &[PathBuf]) -> (Vec<Document>, Vec<UnreadableInput>) {
    let mut documents = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match read_document(path) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                warn!(path = %path.display(), "Skipping unreadable input: {e:#}");
                unreadable.push(UnreadableInput {
                    path: path.clone(),
                    error: format!("{e:#}"),
                });
            }
        }
    }
    (documents, unreadable)
}

/// Read a whole file into memory as an upload.
fn read_document(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Document::new(name, bytes))
}
