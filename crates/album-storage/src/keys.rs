//! Shared key generation for storage backends.
//!
//! Thumbnail key format: `thumbnails/{photo_id}.jpg`.

use album_core::constants::{THUMBNAIL_EXTENSION, THUMBNAIL_PREFIX};
use album_core::models::PhotoId;

use crate::traits::{StorageError, StorageResult};

/// Deterministic key of the derived thumbnail for a photo.
///
/// Rerunning the generator for the same photo always targets the same key,
/// so a regeneration overwrites the previous thumbnail.
pub fn thumbnail_key(photo_id: &PhotoId) -> StorageResult<String> {
    let id = photo_id.as_str();
    if id.is_empty() || id.contains('/') || id.contains('\\') || id.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "Photo id cannot be used in a storage key: {}",
            id
        )));
    }
    Ok(format!("{}/{}.{}", THUMBNAIL_PREFIX, id, THUMBNAIL_EXTENSION))
}

/// Reject keys that could escape the bucket root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
