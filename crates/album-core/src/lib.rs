//! Album Core Library
//!
//! Domain models, configuration and error types shared by every album crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, SelectionMode, SkipPolicy, ThumbnailMode};
pub use error::BackendError;
pub use storage_types::StorageBackend;
