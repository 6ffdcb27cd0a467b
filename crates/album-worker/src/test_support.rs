//! In-memory backends for generator tests

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use album_core::models::{NewPhoto, Pagination, PhotoFilter, PhotoId, PhotoRecord, PhotoUpdate};
use album_core::{BackendError, StorageBackend};
use album_db::PhotoRepository;
use album_storage::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tokio_util::sync::CancellationToken;

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

fn clone_error(err: &BackendError) -> BackendError {
    match err {
        BackendError::Request(m) => BackendError::Request(m.clone()),
        BackendError::Timeout(m) => BackendError::Timeout(m.clone()),
        BackendError::Unauthorized(m) => BackendError::Unauthorized(m.clone()),
        BackendError::NotFound(m) => BackendError::NotFound(m.clone()),
        BackendError::Status { status, body } => BackendError::Status {
            status: *status,
            body: body.clone(),
        },
        BackendError::InvalidResponse(m) => BackendError::InvalidResponse(m.clone()),
        BackendError::InvalidRequest(m) => BackendError::InvalidRequest(m.clone()),
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    photos: Mutex<BTreeMap<PhotoId, PhotoRecord>>,
    list_error: Mutex<Option<BackendError>>,
    update_error: Mutex<Option<BackendError>>,
    cancel_on_update: Mutex<Option<(CancellationToken, usize)>>,
    row_cap: Mutex<Option<usize>>,
    lists: AtomicUsize,
    updates: AtomicUsize,
}

impl MemoryRepository {
    pub fn with_photos(photos: Vec<PhotoRecord>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.photos.lock().unwrap();
            for photo in photos {
                map.insert(photo.id.clone(), photo);
            }
        }
        repo
    }

    pub fn photo(&self, id: &str) -> Option<PhotoRecord> {
        self.photos.lock().unwrap().get(&PhotoId::from(id)).cloned()
    }

    pub fn fail_listing(&self, err: BackendError) {
        *self.list_error.lock().unwrap() = Some(err);
    }

    pub fn fail_updates(&self, err: BackendError) {
        *self.update_error.lock().unwrap() = Some(err);
    }

    /// Cancel `token` once `updates` rows have been written.
    pub fn cancel_after_updates(&self, token: CancellationToken, updates: usize) {
        *self.cancel_on_update.lock().unwrap() = Some((token, updates));
    }

    /// Truncate every listing page to at most `rows`, whatever limit was asked for.
    pub fn cap_rows(&self, rows: usize) {
        *self.row_cap.lock().unwrap() = Some(rows);
    }

    pub fn list_count(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoRepository for MemoryRepository {
    async fn list_photos(
        &self,
        filter: &PhotoFilter,
        page: Pagination,
    ) -> Result<Vec<PhotoRecord>, BackendError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.list_error.lock().unwrap().as_ref() {
            return Err(clone_error(err));
        }

        let limit = match *self.row_cap.lock().unwrap() {
            Some(cap) => page.limit.min(cap),
            None => page.limit,
        };

        Ok(self
            .photos
            .lock()
            .unwrap()
            .values()
            .filter(|p| !filter.missing_thumbnail || !p.has_thumbnail())
            .filter(|p| filter.owner_id.is_none() || p.owner_id == filter.owner_id)
            .skip(page.offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert_photo(&self, photo: &NewPhoto) -> Result<PhotoRecord, BackendError> {
        let mut photos = self.photos.lock().unwrap();
        let id = PhotoId::new(format!("p{}", photos.len() + 1));
        let mut record = PhotoRecord::new(id.as_str(), photo.url.clone());
        record.owner_id = Some(photo.user_id.clone());
        record.tags = photo.tags.clone();
        record.thumbnail_url = photo.thumbnail_url.clone();
        photos.insert(id, record.clone());
        Ok(record)
    }

    async fn update_photo(
        &self,
        id: &PhotoId,
        update: &PhotoUpdate,
    ) -> Result<PhotoRecord, BackendError> {
        if let Some(err) = self.update_error.lock().unwrap().as_ref() {
            return Err(clone_error(err));
        }
        let done = self.updates.fetch_add(1, Ordering::SeqCst) + 1;

        let updated = {
            let mut photos = self.photos.lock().unwrap();
            let record = photos
                .get_mut(id)
                .ok_or_else(|| BackendError::NotFound(format!("photo {}", id)))?;
            if let Some(url) = &update.thumbnail_url {
                record.thumbnail_url = Some(url.clone());
            }
            record.clone()
        };

        if let Some((token, after)) = self.cancel_on_update.lock().unwrap().as_ref() {
            if done >= *after {
                token.cancel();
            }
        }
        Ok(updated)
    }
}

struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

pub struct MemoryStorage {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    overwrites: bool,
    fail_uploads: AtomicBool,
    uploads: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            overwrites: true,
            fail_uploads: AtomicBool::new(false),
            uploads: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Storage that refuses to replace an existing key.
    pub fn write_once() -> Self {
        Self {
            overwrites: false,
            ..Self::new()
        }
    }

    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).map(|o| o.data.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|o| o.content_type.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("bucket is read-only".into()));
        }

        let mut objects = self.objects.lock().unwrap();
        if !self.overwrites && objects.contains_key(storage_key) {
            return Err(StorageError::UploadFailed(format!("{} already exists", storage_key)));
        }
        objects.insert(
            storage_key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(self.public_url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.object(storage_key)
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        Ok(self
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(&prefix))
            .collect())
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("memory://photos/{}", storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    fn overwrites_existing(&self) -> bool {
        self.overwrites
    }
}
