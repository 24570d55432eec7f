//! ZIP export of converted pages.
//!
//! One flat entry per [`RenderedPage`], written under its output name.
//! Entries are stored without compression: JPEG data does not shrink further.

use crate::error::Pdf2JpegError;
use crate::output::RenderedPage;
use std::collections::HashSet;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write `pages` as a ZIP container into `writer`, returning the writer.
///
/// The same output name can appear twice when one file is uploaded twice in
/// a session; later copies are renamed `{stem} (2).jpeg`, `{stem} (3).jpeg`, …
/// so every page survives the export.
pub fn write_zip<W: Write + Seek>(pages: &[RenderedPage], writer: W) -> Result<W, Pdf2JpegError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut used: HashSet<String> = HashSet::with_capacity(pages.len());
    for page in pages {
        let entry_name = unique_entry_name(&page.output_name, &used);
        zip.start_file(entry_name.as_str(), options)?;
        zip.write_all(&page.jpeg_bytes)
            .map_err(|e| Pdf2JpegError::ArchiveWriteFailed(e.into()))?;
        debug!("Archived {} ({} bytes)", entry_name, page.jpeg_bytes.len());
        used.insert(entry_name);
    }

    Ok(zip.finish()?)
}

/// Build the ZIP container in memory.
pub fn zip_bytes(pages: &[RenderedPage]) -> Result<Vec<u8>, Pdf2JpegError> {
    let cursor = write_zip(pages, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Write the ZIP container to `path`.
///
/// Uses atomic write (temp file in the same directory + rename) so a reader
/// never sees a half-written archive.
pub fn write_zip_file(pages: &[RenderedPage], path: impl AsRef<Path>) -> Result<(), Pdf2JpegError> {
    let path = path.as_ref();
    let write_failed = |source: std::io::Error| Pdf2JpegError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_failed)?;

    let tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_failed)?;
    let tmp = write_zip(pages, tmp)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;

    info!("Wrote {} pages to {}", pages.len(), path.display());
    Ok(())
}

fn unique_entry_name(name: &str, used: &HashSet<String>) -> String {
    if !used.contains(name) {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (2..)
        .map(|k| format!("{stem} ({k}){ext}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}
