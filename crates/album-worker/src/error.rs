use std::fmt;

use album_core::BackendError;
use album_processing::ProcessingError;
use album_storage::StorageError;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;

/// Step of the per-photo pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Fetch,
    Decode,
    Resize,
    Encode,
    /// The render task died without reporting a processing error
    Render,
    Upload,
    Persist,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Fetch => "fetch",
            FailureKind::Decode => "decode",
            FailureKind::Resize => "resize",
            FailureKind::Encode => "encode",
            FailureKind::Render => "render",
            FailureKind::Upload => "upload",
            FailureKind::Persist => "persist",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single photo. Never aborts the run.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Failed to fetch source image: {0}")]
    Fetch(String),

    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Failed to resize image: {0}")]
    Resize(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),

    #[error("Thumbnail render task failed: {0}")]
    Render(String),

    #[error("Failed to upload thumbnail: {0}")]
    Upload(String),

    #[error("Failed to save thumbnail URL: {0}")]
    Persist(String),
}

impl ThumbnailError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ThumbnailError::Fetch(_) => FailureKind::Fetch,
            ThumbnailError::Decode(_) => FailureKind::Decode,
            ThumbnailError::Resize(_) => FailureKind::Resize,
            ThumbnailError::Encode(_) => FailureKind::Encode,
            ThumbnailError::Render(_) => FailureKind::Render,
            ThumbnailError::Upload(_) => FailureKind::Upload,
            ThumbnailError::Persist(_) => FailureKind::Persist,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ThumbnailError::Fetch(detail)
            | ThumbnailError::Decode(detail)
            | ThumbnailError::Resize(detail)
            | ThumbnailError::Encode(detail)
            | ThumbnailError::Render(detail)
            | ThumbnailError::Upload(detail)
            | ThumbnailError::Persist(detail) => detail,
        }
    }
}

impl From<ProcessingError> for ThumbnailError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::Decode(detail) => ThumbnailError::Decode(detail),
            ProcessingError::Resize(detail) => ThumbnailError::Resize(detail),
            ProcessingError::Encode(detail) => ThumbnailError::Encode(detail),
        }
    }
}

impl From<JoinError> for ThumbnailError {
    fn from(err: JoinError) -> Self {
        ThumbnailError::Render(err.to_string())
    }
}

/// Failure that ends the whole run
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Failed to list photos after {attempts} attempt(s): {source}")]
    Listing {
        attempts: u32,
        #[source]
        source: BackendError,
    },

    #[error("Backend rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Failed to list stored thumbnails: {0}")]
    StorageListing(#[source] StorageError),
}

impl From<StorageError> for GeneratorError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unauthorized(detail) => GeneratorError::Unauthorized(detail),
            other => GeneratorError::StorageListing(other),
        }
    }
}
