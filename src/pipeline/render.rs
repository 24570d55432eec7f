//! Retrying page renderer: rasterise every page, encode JPEG, name outputs.
//!
//! Each attempt is all-or-nothing. Pages are encoded as they come off the
//! backend and collected into a buffer that belongs to that attempt only; if
//! any page fails the buffer is dropped and the next attempt starts over from
//! page 1.

use super::backend::{PdfBackend, RasterOptions};
use super::encode::encode_jpeg;
use super::retry::Sleeper;
use crate::config::ConversionConfig;
use crate::error::{DocumentError, RenderError};
use crate::output::{page_output_name, Document, RenderedPage};
use image::DynamicImage;
use std::time::Instant;
use tracing::{debug, info};

/// Convert every page of a `Ready` document to a named JPEG.
///
/// Retries per [`ConversionConfig::retry_policy`]. On success pages are in
/// page order; the first is `{base}.jpeg`, then `{base}_2.jpeg`, ….
pub fn render_document(
    document: &Document,
    backend: &dyn PdfBackend,
    config: &ConversionConfig,
    sleeper: &dyn Sleeper,
) -> Result<Vec<RenderedPage>, DocumentError> {
    let start = Instant::now();
    let base_name = document.base_name();
    let options = RasterOptions {
        dpi: config.dpi,
        max_pixels: config.max_rendered_pixels,
    };

    let pages = config
        .retry_policy()
        .run(sleeper, |attempt| {
            debug!("{}: render attempt {}", document.name, attempt);
            render_attempt(document, &base_name, backend, &options, config.jpeg_quality)
        })
        .map_err(|exhausted| DocumentError::RetriesExhausted {
            attempts: exhausted.attempts,
            last_error: exhausted.last_error,
        })?;

    info!(
        "{}: {} pages rendered in {}ms",
        document.name,
        pages.len(),
        start.elapsed().as_millis()
    );
    Ok(pages)
}

/// One complete pass over the document.
fn render_attempt(
    document: &Document,
    base_name: &str,
    backend: &dyn PdfBackend,
    options: &RasterOptions,
    quality: u8,
) -> Result<Vec<RenderedPage>, RenderError> {
    let mut pages = Vec::new();
    let mut sink = |page_num: usize, image: DynamicImage| -> Result<(), RenderError> {
        let jpeg_bytes = encode_jpeg(&image, quality).map_err(|e| RenderError::Encode {
            page: page_num,
            detail: e.to_string(),
        })?;
        pages.push(RenderedPage {
            output_name: page_output_name(base_name, page_num),
            jpeg_bytes,
        });
        Ok(())
    };
    backend.rasterise(&document.bytes, options, &mut sink)?;

    if pages.is_empty() {
        return Err(RenderError::NoPages);
    }
    Ok(pages)
}
