//! The rasterisation seam: open a PDF held in memory and render its pages.
//!
//! [`PdfBackend`] is what the classifier and the renderer talk to.
//! [`PdfiumBackend`] is the production implementation over `pdfium-render`;
//! tests substitute scripted backends so the pipeline can be exercised
//! without a pdfium shared library.
//!
//! ## Why reload pdfium per operation?
//!
//! The upstream `Pdfium` handle is not something we want to share across
//! threads, and `dlopen`/`LoadLibrary` results are cached by the OS, so
//! binding again per document is close to free. Keeping the backend
//! stateless makes it `Send + Sync` without any locking.

use crate::error::{Pdf2JpegError, RenderError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, warn};

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Why a document could not be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    /// The document is encrypted and cannot be read without a password.
    PasswordRequired,
    /// The document opened, but carries a security handler (for example an
    /// owner password restricting permissions).
    Encrypted,
    /// Any other parse failure.
    Unreadable(String),
}

/// Rendering parameters for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    pub dpi: u32,
    /// Cap on the longest edge of each rendered page, in pixels.
    pub max_pixels: u32,
}

/// Receives each rasterised page as soon as it is rendered.
///
/// Arguments are the 1-indexed page number and the page image. Returning an
/// error aborts the rest of the render.
pub type PageSink<'a> = dyn FnMut(usize, DynamicImage) -> Result<(), RenderError> + 'a;

/// A PDF engine able to open and rasterise documents held in memory.
pub trait PdfBackend: Send + Sync {
    /// Open the document and return its page count.
    fn open(&self, bytes: &[u8]) -> Result<usize, OpenError>;

    /// Render every page in order, handing each image to `sink`.
    ///
    /// Returns the number of pages rendered.
    fn rasterise(
        &self,
        bytes: &[u8],
        options: &RasterOptions,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, RenderError>;
}

/// Production backend built on pdfium.
///
/// Library discovery order:
/// 1. the explicit path given to [`PdfiumBackend::with_library`]
/// 2. `PDFIUM_LIB_PATH` (path to the library file)
/// 3. system library search paths
#[derive(Debug, Clone)]
pub struct PdfiumBackend {
    library_path: Option<PathBuf>,
}

impl PdfiumBackend {
    /// Create a backend, verifying a pdfium library can be bound.
    pub fn new() -> Result<Self, Pdf2JpegError> {
        let library_path = std::env::var_os("PDFIUM_LIB_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self::verified(Self { library_path })
    }

    /// Create a backend bound to the pdfium library file at `path`.
    pub fn with_library(path: impl Into<PathBuf>) -> Result<Self, Pdf2JpegError> {
        Self::verified(Self {
            library_path: Some(path.into()),
        })
    }

    fn verified(backend: Self) -> Result<Self, Pdf2JpegError> {
        backend
            .bind()
            .map_err(|e| Pdf2JpegError::PdfiumBindingFailed(e.to_string()))?;
        Ok(backend)
    }

    fn bind(&self) -> Result<Pdfium, PdfiumError> {
        let bindings = match &self.library_path {
            Some(path) => {
                debug!(path = %path.display(), "Binding pdfium from explicit path");
                Pdfium::bind_to_library(path)?
            }
            None => Pdfium::bind_to_system_library()?,
        };
        Ok(Pdfium::new(bindings))
    }
}

/// Classify a pdfium load failure.
fn map_load_error(e: PdfiumError) -> OpenError {
    match e {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            OpenError::PasswordRequired
        }
        other => OpenError::Unreadable(format!("{other:?}")),
    }
}

/// Anything other than an unprotected document counts as encrypted,
/// including security handler revisions pdfium-render does not name.
fn check_security_handler(
    revision: Result<PdfSecurityHandlerRevision, PdfiumError>,
) -> Result<(), OpenError> {
    match revision {
        Ok(PdfSecurityHandlerRevision::Unprotected) => Ok(()),
        Ok(other) => {
            debug!(revision = ?other, "Document carries a security handler");
            Err(OpenError::Encrypted)
        }
        Err(e) => {
            debug!(error = ?e, "Unrecognised security handler revision");
            Err(OpenError::Encrypted)
        }
    }
}

/// Pixel dimensions for a page at `dpi`, longest edge capped at `max_pixels`.
///
/// Both results are at least 1 and aspect ratio is preserved when capping.
fn compute_render_dimensions(
    width_points: f32,
    height_points: f32,
    dpi: u32,
    max_pixels: u32,
) -> (u32, u32) {
    let raw_w = (width_points * dpi as f32 / POINTS_PER_INCH).max(1.0);
    let raw_h = (height_points * dpi as f32 / POINTS_PER_INCH).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim <= max_pixels as f32 {
        return (raw_w as u32, raw_h as u32);
    }

    let ratio = max_pixels as f32 / max_dim;
    if raw_w >= raw_h {
        (max_pixels, ((raw_h * ratio) as u32).clamp(1, max_pixels))
    } else {
        (((raw_w * ratio) as u32).clamp(1, max_pixels), max_pixels)
    }
}

impl PdfBackend for PdfiumBackend {
    fn open(&self, bytes: &[u8]) -> Result<usize, OpenError> {
        let pdfium = self
            .bind()
            .map_err(|e| OpenError::Unreadable(format!("pdfium unavailable: {e:?}")))?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(map_load_error)?;
        check_security_handler(document.permissions().security_handler_revision())?;
        Ok(document.pages().len() as usize)
    }

    fn rasterise(
        &self,
        bytes: &[u8],
        options: &RasterOptions,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, RenderError> {
        let pdfium = self
            .bind()
            .map_err(|e| RenderError::Open(format!("pdfium unavailable: {e:?}")))?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| RenderError::Open(format!("{e:?}")))?;

        let mut rendered = 0;
        for (idx, page) in document.pages().iter().enumerate() {
            let page_num = idx + 1;
            let width_points = page.width().value;
            let height_points = page.height().value;
            let (target_w, target_h) = compute_render_dimensions(
                width_points,
                height_points,
                options.dpi,
                options.max_pixels,
            );

            let uncapped_w = (width_points * options.dpi as f32 / POINTS_PER_INCH) as u32;
            if target_w < uncapped_w {
                warn!(
                    page = page_num,
                    raw_width = uncapped_w,
                    capped_width = target_w,
                    capped_height = target_h,
                    "Page dimensions capped to {}px",
                    options.max_pixels
                );
            }

            let render_config = PdfRenderConfig::new()
                .set_target_width(target_w as i32)
                .set_maximum_height(target_h as i32);

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                RenderError::Rasterisation {
                    page: page_num,
                    detail: format!("{e:?}"),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                page_num,
                image.width(),
                image.height()
            );

            sink(page_num, image)?;
            rendered += 1;
        }

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_page_at_200_dpi() {
        // US Letter: 612 × 792 pt
        assert_eq!(compute_render_dimensions(612.0, 792.0, 200, 10_000), (1700, 2200));
    }

    #[test]
    fn oversized_page_is_capped_preserving_aspect() {
        let (w, h) = compute_render_dimensions(2384.0, 3370.0, 200, 4000);
        assert_eq!(h, 4000);
        assert!(w < 4000 && w > 2800, "got {w}");
    }

    #[test]
    fn degenerate_page_is_at_least_one_pixel() {
        assert_eq!(compute_render_dimensions(0.0, 0.0, 72, 100), (1, 1));
    }

    #[test]
    fn password_error_maps_to_password_required() {
        let e = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError);
        assert_eq!(map_load_error(e), OpenError::PasswordRequired);
    }

    #[test]
    fn unprotected_document_passes_security_check() {
        assert_eq!(
            check_security_handler(Ok(PdfSecurityHandlerRevision::Unprotected)),
            Ok(())
        );
    }

    #[test]
    fn owner_password_revisions_are_encrypted() {
        for revision in [
            PdfSecurityHandlerRevision::Revision2,
            PdfSecurityHandlerRevision::Revision3,
            PdfSecurityHandlerRevision::Revision4,
        ] {
            assert_eq!(
                check_security_handler(Ok(revision)),
                Err(OpenError::Encrypted),
                "{revision:?}"
            );
        }
    }

    #[test]
    fn unknown_security_revision_is_encrypted() {
        assert_eq!(
            check_security_handler(Err(PdfiumError::UnknownPdfSecurityHandlerRevision)),
            Err(OpenError::Encrypted)
        );
    }

    #[test]
    fn format_error_maps_to_unreadable() {
        let e = PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError);
        assert!(matches!(map_load_error(e), OpenError::Unreadable(_)));
    }
}
