//! Image processor - decoding and EXIF inspection

use crate::error::ProcessingError;
use crate::metadata::ImageMetadata;
use image::{DynamicImage, GenericImageView, ImageReader};
use img_parts::{DynImage, ImageEXIF};
use std::io::Cursor;

/// Marker some containers leave in front of the TIFF payload
const EXIF_HEADER: &[u8] = b"Exif\0\0";

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode image bytes, sniffing the format from the content.
    pub fn decode(data: &[u8]) -> Result<DynamicImage, ProcessingError> {
        Self::decode_with_metadata(data).map(|(img, _)| img)
    }

    /// Decode image bytes and report what was found along the way.
    pub fn decode_with_metadata(
        data: &[u8],
    ) -> Result<(DynamicImage, ImageMetadata), ProcessingError> {
        if data.is_empty() {
            return Err(ProcessingError::Decode("empty input".to_string()));
        }

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;
        let format = reader
            .format()
            .map(|f| format!("{:?}", f))
            .unwrap_or_else(|| "unknown".to_string());
        let img = reader
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        let metadata = ImageMetadata {
            width,
            height,
            format,
            size_bytes: data.len() as u64,
            exif_orientation: Self::read_exif_orientation(data),
        };

        Ok((img, metadata))
    }

    /// Read the EXIF orientation tag (274) from JPEG, PNG or WebP data.
    ///
    /// Missing or unreadable metadata yields `None`; it never fails the caller.
    pub fn read_exif_orientation(data: &[u8]) -> Option<u16> {
        let container = match DynImage::from_bytes(data.to_vec().into()) {
            Ok(Some(container)) => container,
            _ => return None,
        };
        let raw = container.exif()?;
        let tiff = raw.strip_prefix(EXIF_HEADER).unwrap_or(&raw[..]).to_vec();

        let exif = match exif::Reader::new().read_raw(tiff) {
            Ok(exif) => exif,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable EXIF block");
                return None;
            }
        };

        exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .and_then(|value| u16::try_from(value).ok())
    }

    /// Clockwise rotation needed to display an image upright.
    ///
    /// Only the pure rotations are corrected; mirrored orientations are left alone.
    pub fn rotation_for_orientation(orientation: Option<u16>) -> Option<u16> {
        match orientation {
            Some(3) => Some(180),
            Some(6) => Some(90),
            Some(8) => Some(270),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use img_parts::{jpeg::Jpeg, ImageEXIF};
    use std::io::Cursor;

    /// Little-endian TIFF block holding a single Orientation entry.
    pub fn orientation_tiff(orientation: u16) -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II");
        tiff.extend_from_slice(&42u16.to_le_bytes());
        tiff.extend_from_slice(&8u32.to_le_bytes());
        // IFD0 with one entry
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x0112u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes()); // SHORT
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&orientation.to_le_bytes());
        tiff.extend_from_slice(&[0, 0]);
        // no next IFD
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff
    }

    /// Solid JPEG of the given size.
    pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 40])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    /// JPEG of the given size tagged with an EXIF orientation.
    pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
        let mut jpeg = Jpeg::from_bytes(jpeg(width, height).into()).unwrap();
        jpeg.set_exif(Some(orientation_tiff(orientation).into()));
        jpeg.encoder().bytes().to_vec()
    }
}
