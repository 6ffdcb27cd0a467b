//! Source image metadata

use serde::{Deserialize, Serialize};

/// What was learned about a source image while decoding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub size_bytes: u64,
    /// Raw EXIF orientation tag, when the image carries one
    pub exif_orientation: Option<u16>,
}
