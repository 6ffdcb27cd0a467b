use crate::error::ProcessingError;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use std::fmt;
use std::str::FromStr;

/// Output box of a thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn ensure_non_zero(self) -> Result<Self, ProcessingError> {
        if self.width == 0 || self.height == 0 {
            return Err(ProcessingError::Resize(format!(
                "target size {} has a zero dimension",
                self
            )));
        }
        Ok(self)
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for TargetSize {
    type Err = String;

    /// Parse dimensions from string format: "WxH"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| "Invalid dimensions format. Expected: WxH".to_string())?;

        let width = width
            .parse::<u32>()
            .map_err(|_| format!("Invalid width: {}", width))?;
        let height = height
            .parse::<u32>()
            .map_err(|_| format!("Invalid height: {}", height))?;

        if width == 0 || height == 0 {
            return Err("Width and height must be positive".to_string());
        }

        Ok(TargetSize { width, height })
    }
}

/// Region kept by a center crop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Thumbnail resize operations
pub struct ThumbnailResize;

impl ThumbnailResize {
    /// Size an image must be scaled to so that it covers the target box.
    ///
    /// Both sides are floored but never drop below the target.
    pub fn cover_dimensions(
        orig_width: u32,
        orig_height: u32,
        target: TargetSize,
    ) -> Result<(u32, u32), ProcessingError> {
        let target = target.ensure_non_zero()?;
        ensure_source(orig_width, orig_height)?;

        let scale = f64::max(
            target.width as f64 / orig_width as f64,
            target.height as f64 / orig_height as f64,
        );
        let width = ((orig_width as f64 * scale).floor() as u32).max(target.width);
        let height = ((orig_height as f64 * scale).floor() as u32).max(target.height);

        Ok((width, height))
    }

    /// Centered window of the target size inside a scaled image.
    pub fn crop_box(scaled_width: u32, scaled_height: u32, target: TargetSize) -> CropBox {
        CropBox {
            left: scaled_width.saturating_sub(target.width) / 2,
            top: scaled_height.saturating_sub(target.height) / 2,
            width: target.width.min(scaled_width),
            height: target.height.min(scaled_height),
        }
    }

    /// Window of the source that survives a cover crop.
    ///
    /// This is the centered crop of the scaled image mapped back onto source
    /// pixels. Each side is at least one pixel and stays inside the source.
    pub fn source_window(
        orig_width: u32,
        orig_height: u32,
        target: TargetSize,
    ) -> Result<CropBox, ProcessingError> {
        let (scaled_width, scaled_height) =
            Self::cover_dimensions(orig_width, orig_height, target)?;
        let crop = Self::crop_box(scaled_width, scaled_height, target);

        let (left, width) = to_source_axis(crop.left, crop.width, orig_width, scaled_width);
        let (top, height) = to_source_axis(crop.top, crop.height, orig_height, scaled_height);

        Ok(CropBox {
            left,
            top,
            width,
            height,
        })
    }

    /// Center crop to the target aspect ratio, then scale to exactly the target box.
    ///
    /// Only the kept window is resampled, so the intermediate buffer never
    /// exceeds the source or the target, whatever the source aspect ratio.
    pub fn cover_crop(img: &DynamicImage, target: TargetSize) -> Result<DynamicImage, ProcessingError> {
        let (orig_width, orig_height) = img.dimensions();
        let window = Self::source_window(orig_width, orig_height, target)?;

        tracing::debug!(
            from = %format!("{}x{}", orig_width, orig_height),
            window = %format!("{}x{}", window.width, window.height),
            crop_left = window.left,
            crop_top = window.top,
            "Cover resize"
        );

        let cropped = img.crop_imm(window.left, window.top, window.width, window.height);
        Ok(cropped.resize_exact(target.width, target.height, FilterType::Lanczos3))
    }

    /// Size that fits inside the target box keeping the aspect ratio.
    ///
    /// Images already inside the box keep their size.
    pub fn contain_dimensions(
        orig_width: u32,
        orig_height: u32,
        target: TargetSize,
    ) -> Result<(u32, u32), ProcessingError> {
        let target = target.ensure_non_zero()?;
        ensure_source(orig_width, orig_height)?;

        if orig_width <= target.width && orig_height <= target.height {
            return Ok((orig_width, orig_height));
        }

        let scale = f64::min(
            target.width as f64 / orig_width as f64,
            target.height as f64 / orig_height as f64,
        );
        let width = ((orig_width as f64 * scale).round() as u32).clamp(1, target.width);
        let height = ((orig_height as f64 * scale).round() as u32).clamp(1, target.height);

        Ok((width, height))
    }

    /// Shrink to fit inside the target box without cropping or upscaling.
    pub fn contain(img: &DynamicImage, target: TargetSize) -> Result<DynamicImage, ProcessingError> {
        let (orig_width, orig_height) = img.dimensions();
        let (width, height) = Self::contain_dimensions(orig_width, orig_height, target)?;

        if (width, height) == (orig_width, orig_height) {
            return Ok(img.clone());
        }
        Ok(img.resize_exact(width, height, FilterType::Lanczos3))
    }
}

/// Map an offset and length on a scaled axis back onto the source axis.
fn to_source_axis(offset: u32, len: u32, orig: u32, scaled: u32) -> (u32, u32) {
    let (orig, scaled) = (u64::from(orig), u64::from(scaled));
    let len = ((u64::from(len) * orig + scaled / 2) / scaled).clamp(1, orig);
    let offset = (u64::from(offset) * orig / scaled).min(orig - len);
    (offset as u32, len as u32)
}

fn ensure_source(width: u32, height: u32) -> Result<(), ProcessingError> {
    if width == 0 || height == 0 {
        return Err(ProcessingError::Resize(format!(
            "source image {}x{} has a zero dimension",
            width, height
        )));
    }
    Ok(())
}
