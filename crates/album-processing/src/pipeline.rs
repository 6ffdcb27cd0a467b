//! Thumbnail rendering pipeline
//!
//! Runs the CPU-bound steps for one photo: decode, orientation, RGB
//! normalization, resize, encode. Callers on an async runtime should run
//! `render` on a blocking thread.

use crate::compression::{ImageCompressor, DEFAULT_JPEG_QUALITY};
use crate::error::ProcessingError;
use crate::image::{ImageOrientation, ImageProcessor, TargetSize, ThumbnailResize};
use crate::metadata::ImageMetadata;
use album_core::{Config, ThumbnailMode};
use image::{DynamicImage, GenericImageView};

/// How thumbnails are shaped and encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSpec {
    pub size: TargetSize,
    pub mode: ThumbnailMode,
    pub quality: u8,
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        Self {
            size: TargetSize::new(300, 400),
            mode: ThumbnailMode::Cover,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ThumbnailSpec {
    pub fn from_config(config: &Config) -> Self {
        Self {
            size: TargetSize::new(config.thumbnail_width, config.thumbnail_height),
            mode: config.thumbnail_mode,
            quality: config.thumbnail_quality,
        }
    }
}

/// Encoded thumbnail plus what it was made from
#[derive(Debug, Clone)]
pub struct RenderedThumbnail {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub source: ImageMetadata,
}

pub struct ThumbnailPipeline;

impl ThumbnailPipeline {
    pub fn render(data: &[u8], spec: &ThumbnailSpec) -> Result<RenderedThumbnail, ProcessingError> {
        let (img, source) = ImageProcessor::decode_with_metadata(data)?;
        let img = ImageOrientation::apply_orientation(img, source.exif_orientation);
        let img = DynamicImage::ImageRgb8(img.to_rgb8());

        let resized = match spec.mode {
            ThumbnailMode::Cover => ThumbnailResize::cover_crop(&img, spec.size)?,
            ThumbnailMode::Contain => ThumbnailResize::contain(&img, spec.size)?,
        };
        let (width, height) = resized.dimensions();
        let bytes = ImageCompressor::encode_jpeg(&resized, spec.quality)?;

        tracing::debug!(
            source_format = %source.format,
            source_width = source.width,
            source_height = source.height,
            orientation = ?source.exif_orientation,
            width,
            height,
            size_bytes = bytes.len(),
            "Rendered thumbnail"
        );

        Ok(RenderedThumbnail {
            bytes,
            width,
            height,
            source,
        })
    }
}
