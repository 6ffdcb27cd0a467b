use super::processor::ImageProcessor;
use image::DynamicImage;

/// Image orientation operations
pub struct ImageOrientation;

impl ImageOrientation {
    /// Apply EXIF orientation correction to an image
    pub fn apply_exif_orientation(img: DynamicImage, data: &[u8]) -> DynamicImage {
        let orientation = ImageProcessor::read_exif_orientation(data);
        Self::apply_orientation(img, orientation)
    }

    /// Rotate an image upright given its EXIF orientation value.
    pub fn apply_orientation(img: DynamicImage, orientation: Option<u16>) -> DynamicImage {
        let rotate = ImageProcessor::rotation_for_orientation(orientation);

        tracing::debug!(
            orientation = ?orientation,
            rotate = ?rotate,
            "Applying EXIF orientation"
        );

        match rotate {
            Some(angle) => Self::rotate_by_angle(img, angle),
            None => img,
        }
    }

    /// Rotate image by specified angle (90, 180, or 270 degrees clockwise)
    pub fn rotate_by_angle(img: DynamicImage, angle: u16) -> DynamicImage {
        match angle {
            90 => img.rotate90(),
            180 => img.rotate180(),
            270 => img.rotate270(),
            _ => img,
        }
    }
}
