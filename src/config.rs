//! Configuration types for PDF-to-JPEG conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One struct holds every knob so a batch
//! run can be logged and reproduced from a single value.

use crate::error::Pdf2JpegError;
use crate::pipeline::retry::RetryPolicy;
use crate::progress::ProgressCallback;
use std::fmt;
use std::time::Duration;

/// Default name of the exported ZIP container.
pub const DEFAULT_ARCHIVE_NAME: &str = "converted_pages.zip";

/// Configuration for a batch conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2jpeg::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .jpeg_quality(90)
///     .max_attempts(5)
///     .build()
///     .unwrap();
/// assert_eq!(config.retry_policy().max_attempts, 5);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–400. Default: 200.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 10 000.
    ///
    /// A safety cap independent of DPI: a 200-DPI render of an A0 poster
    /// would otherwise allocate a 6 600 × 9 400 px bitmap per page.
    pub max_rendered_pixels: u32,

    /// JPEG quality, 1–100. Default: 75.
    pub jpeg_quality: u8,

    /// Render attempts per document before it is recorded as failed. Default: 3.
    pub max_attempts: u32,

    /// Fixed pause between failed render attempts, in milliseconds. Default: 2000.
    pub retry_delay_ms: u64,

    /// Optional per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 10_000,
            jpeg_quality: 75,
            max_attempts: 3,
            retry_delay_ms: 2000,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The retry policy the renderer applies to each document.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.retry_delay_ms = ms;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2JpegError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(Pdf2JpegError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(Pdf2JpegError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if c.max_attempts == 0 {
            return Err(Pdf2JpegError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
