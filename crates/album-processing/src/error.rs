use thiserror::Error;

/// Failure while turning source bytes into a thumbnail
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to resize image: {0}")]
    Resize(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),
}
