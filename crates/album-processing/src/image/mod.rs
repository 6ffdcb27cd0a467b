//! Image processing module
//!
//! - Decoding and EXIF inspection (processor)
//! - Orientation correction (orientation)
//! - Cover/contain resizing and center cropping (resize)

pub mod orientation;
pub mod processor;
pub mod resize;

pub use orientation::ImageOrientation;
pub use processor::ImageProcessor;
pub use resize::{CropBox, TargetSize, ThumbnailResize};
