//! Image encoding: `DynamicImage` → JPEG bytes.
//!
//! pdfium hands back RGBA bitmaps; JPEG has no alpha channel, so pages are
//! flattened to RGB before encoding.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// Encode a rasterised page as JPEG at the given quality (1–100).
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&rgb)?;

    debug!(
        "Encoded {}x{} image → {} bytes JPEG",
        rgb.width(),
        rgb.height(),
        buf.len()
    );

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn encode_rgba_image_as_jpeg() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let data = encode_jpeg(&img, 75).expect("encode should succeed");
        // SOI marker
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&data).expect("valid JPEG");
        assert_eq!(decoded.dimensions(), (10, 10));
    }

    #[test]
    fn higher_quality_is_not_smaller() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255])
        }));
        let low = encode_jpeg(&img, 10).unwrap();
        let high = encode_jpeg(&img, 95).unwrap();
        assert!(high.len() >= low.len());
    }
}
