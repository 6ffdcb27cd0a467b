use crate::error::ProcessingError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};

/// Default JPEG quality for thumbnails
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// JPEG output for thumbnails
pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode as baseline JPEG. Any alpha channel is dropped first.
    pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ProcessingError> {
        match img {
            DynamicImage::ImageRgb8(rgb) => Self::encode_rgb(rgb, quality),
            other => Self::encode_rgb(&other.to_rgb8(), quality),
        }
    }

    fn encode_rgb(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, ProcessingError> {
        let quality = quality.clamp(1, 100);
        let mut buf = Vec::new();

        JpegEncoder::new_with_quality(&mut buf, quality)
            .encode_image(rgb)
            .map_err(|e| ProcessingError::Encode(e.to_string()))?;

        Ok(buf)
    }
}
