//! Repository trait abstraction for the photo table
//!
//! This trait defines the minimal interface the thumbnail tools need from the
//! hosted table, allowing for easy faking in tests without a backend.

use album_core::models::{NewPhoto, Pagination, PhotoFilter, PhotoId, PhotoRecord, PhotoUpdate};
use album_core::BackendError;
use async_trait::async_trait;

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// List one page of photos matching the filter, in a stable order.
    async fn list_photos(
        &self,
        filter: &PhotoFilter,
        page: Pagination,
    ) -> Result<Vec<PhotoRecord>, BackendError>;

    /// Insert a photo and return the stored row.
    async fn insert_photo(&self, photo: &NewPhoto) -> Result<PhotoRecord, BackendError>;

    /// Apply a partial update and return the updated row.
    ///
    /// Fails with `NotFound` when no row has the given id.
    async fn update_photo(
        &self,
        id: &PhotoId,
        update: &PhotoUpdate,
    ) -> Result<PhotoRecord, BackendError>;
}
