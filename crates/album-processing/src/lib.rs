//! Album Image Processing Library
//!
//! Turns the bytes of an uploaded photo into a normalized JPEG thumbnail:
//! decode, EXIF orientation, RGB normalization, resize/crop, encode.

pub mod compression;
pub mod error;
pub mod image;
pub mod metadata;
pub mod pipeline;

// Re-export commonly used types
pub use compression::ImageCompressor;
pub use error::ProcessingError;
pub use image::{CropBox, ImageOrientation, ImageProcessor, TargetSize, ThumbnailResize};
pub use metadata::ImageMetadata;
pub use pipeline::{RenderedThumbnail, ThumbnailPipeline, ThumbnailSpec};
