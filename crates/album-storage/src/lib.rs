//! Album Storage Library
//!
//! Blob storage abstraction for originals and derived thumbnails, with a
//! backend for the hosted bucket API and one for the local filesystem.
//!
//! # Key format
//!
//! Keys are paths relative to the bucket root, e.g. `thumbnails/{photo_id}.jpg`.
//! Keys must not contain `..` or a leading `/`. Thumbnail key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod hosted;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use album_core::StorageBackend;
pub use factory::create_storage;
pub use hosted::HostedStorage;
pub use keys::{thumbnail_key, validate_key};
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
