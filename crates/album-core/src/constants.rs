//! Application-wide constants.

/// Bucket holding both originals and derived thumbnails.
pub const DEFAULT_PHOTOS_BUCKET: &str = "photos";

/// Table holding photo records.
pub const DEFAULT_PHOTOS_TABLE: &str = "photos";

/// Key prefix under which derived thumbnails live inside the bucket.
pub const THUMBNAIL_PREFIX: &str = "thumbnails";

/// File suffix of derived thumbnails.
pub const THUMBNAIL_EXTENSION: &str = "jpg";

/// Content type used for every uploaded thumbnail.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

/// Upper bound for the worker pool, whatever the configuration asks for.
pub const MAX_WORKER_CONCURRENCY: usize = 16;

/// Largest listing page the hosted table API returns in one response.
///
/// Larger requests come back truncated to this many rows.
pub const MAX_LIST_PAGE_SIZE: usize = 1000;
