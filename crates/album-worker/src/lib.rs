//! Album thumbnail worker
//!
//! Walks the photo table, renders a thumbnail for every photo that lacks one,
//! stores it under `thumbnails/{id}.jpg` and records its public URL.

pub mod error;
pub mod fetch;
pub mod generator;
pub mod policy;
pub mod retry;
pub mod summary;

#[cfg(test)]
mod test_support;

pub use error::{FailureKind, GeneratorError, ThumbnailError};
pub use fetch::{FetchError, ImageFetcher};
pub use generator::{GeneratorOptions, ThumbnailGenerator};
pub use policy::is_processed;
pub use retry::RetryPolicy;
pub use summary::{ProcessOutcome, PurgeSummary, RecordFailure, RunSummary};
