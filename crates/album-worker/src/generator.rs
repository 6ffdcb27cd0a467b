//! Thumbnail generator
//!
//! One pass over the photo table: list every candidate first, then fan the
//! records out to a bounded pool of workers. Each record is independent; a
//! failure is recorded in the run summary and the pass continues.

use std::sync::Arc;
use std::time::{Duration, Instant};

use album_core::constants::{
    MAX_LIST_PAGE_SIZE, MAX_WORKER_CONCURRENCY, THUMBNAIL_CONTENT_TYPE, THUMBNAIL_PREFIX,
};
use album_core::models::{Pagination, PhotoFilter, PhotoRecord, PhotoUpdate};
use album_core::{BackendError, Config, SelectionMode, SkipPolicy};
use album_db::PhotoRepository;
use album_processing::{ThumbnailPipeline, ThumbnailSpec};
use album_storage::{thumbnail_key, Storage, StorageError};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::error::{GeneratorError, ThumbnailError};
use crate::fetch::{FetchError, ImageFetcher};
use crate::policy::is_processed;
use crate::retry::RetryPolicy;
use crate::summary::{ProcessOutcome, PurgeSummary, RunSummary};

/// Knobs for a generator run
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub spec: ThumbnailSpec,
    pub skip_policy: SkipPolicy,
    pub selection: SelectionMode,
    /// Regenerate even when a thumbnail is already present
    pub force: bool,
    pub concurrency: usize,
    pub transfer_retry: RetryPolicy,
    pub list_max_attempts: u32,
    pub list_retry_delay: Duration,
    pub page_size: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            spec: ThumbnailSpec::default(),
            skip_policy: SkipPolicy::Presence,
            selection: SelectionMode::Missing,
            force: false,
            concurrency: 4,
            transfer_retry: RetryPolicy::default(),
            list_max_attempts: 3,
            list_retry_delay: Duration::from_secs(2),
            page_size: 500,
        }
    }
}

impl GeneratorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            spec: ThumbnailSpec::from_config(config),
            skip_policy: config.skip_policy,
            selection: config.selection,
            force: false,
            concurrency: config.effective_concurrency(),
            transfer_retry: RetryPolicy::from_config(config),
            list_max_attempts: config.list_max_attempts,
            list_retry_delay: Duration::from_secs(config.list_retry_delay_secs),
            page_size: config.list_page_size,
        }
    }

    /// Filter sent to the backend.
    ///
    /// The server-side `thumbnail_url is null` shortcut only agrees with the
    /// presence policy; forced and strict runs must see every row.
    fn listing_filter(&self) -> PhotoFilter {
        let narrow = self.selection == SelectionMode::Missing
            && self.skip_policy == SkipPolicy::Presence
            && !self.force;
        if narrow {
            PhotoFilter::missing_thumbnail()
        } else {
            PhotoFilter::all()
        }
    }
}

#[derive(Clone)]
pub struct ThumbnailGenerator {
    repository: Arc<dyn PhotoRepository>,
    storage: Arc<dyn Storage>,
    fetcher: ImageFetcher,
    options: GeneratorOptions,
}

impl ThumbnailGenerator {
    pub fn new(
        repository: Arc<dyn PhotoRepository>,
        storage: Arc<dyn Storage>,
        fetcher: ImageFetcher,
        options: GeneratorOptions,
    ) -> Self {
        Self {
            repository,
            storage,
            fetcher,
            options,
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate thumbnails for every photo that needs one.
    ///
    /// Listing happens up front and is the only fatal step. Cancellation is
    /// checked before each record is dispatched; records already running are
    /// allowed to finish.
    pub async fn process_all(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, GeneratorError> {
        let start = Instant::now();
        let records = self.list_records().await?;
        let total = records.len();
        let concurrency = self.options.concurrency.clamp(1, MAX_WORKER_CONCURRENCY);

        tracing::info!(
            photos = total,
            concurrency,
            force = self.options.force,
            skip_policy = ?self.options.skip_policy,
            "Starting thumbnail generation"
        );

        let mut summary = RunSummary::default();
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut handles = Vec::with_capacity(total);

        for record in records {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let generator = self.clone();
            let photo_id = record.id.clone();
            let handle = tokio::spawn(async move {
                let result = generator.process_one(&record).await;
                drop(permit);
                result
            });
            handles.push((photo_id, handle));
        }

        summary.not_started = total - handles.len();

        for (photo_id, handle) in handles {
            match handle.await {
                Ok(result) => summary.record(photo_id, result),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    tracing::error!(photo_id = %photo_id, error = %e, "Thumbnail task aborted");
                    summary.not_started += 1;
                }
            }
        }

        tracing::info!(
            considered = summary.considered,
            skipped = summary.skipped,
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnail generation finished"
        );

        Ok(summary)
    }

    /// Generate, store and record the thumbnail for one photo.
    pub async fn process_one(
        &self,
        record: &PhotoRecord,
    ) -> Result<ProcessOutcome, ThumbnailError> {
        if !self.options.force && is_processed(record, self.options.skip_policy) {
            tracing::debug!(photo_id = %record.id, "Thumbnail already present, skipping");
            return Ok(ProcessOutcome::Skipped);
        }

        let start = Instant::now();
        let result = self.generate(record).await;

        match &result {
            Ok(url) => tracing::info!(
                photo_id = %record.id,
                thumbnail_url = %url,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Thumbnail generated"
            ),
            Err(e) => tracing::warn!(
                photo_id = %record.id,
                step = %e.kind(),
                error = %e,
                "Thumbnail generation failed"
            ),
        }

        result.map(|url| ProcessOutcome::Generated { url })
    }

    async fn generate(&self, record: &PhotoRecord) -> Result<String, ThumbnailError> {
        let retry = self.options.transfer_retry;

        let key = thumbnail_key(&record.id).map_err(|e| ThumbnailError::Upload(e.to_string()))?;

        let source = retry
            .run("fetch", FetchError::is_transient, || self.fetcher.fetch(&record.url))
            .await
            .map_err(|e| ThumbnailError::Fetch(e.to_string()))?;

        let spec = self.options.spec;
        let rendered = tokio::task::spawn_blocking(move || ThumbnailPipeline::render(&source, &spec))
            .await
            .map_err(|e| {
                tracing::error!(photo_id = %record.id, error = %e, "Thumbnail render task died");
                ThumbnailError::from(e)
            })??;

        if !self.storage.overwrites_existing() {
            if let Err(e) = self.storage.delete(&key).await {
                tracing::warn!(
                    photo_id = %record.id,
                    key = %key,
                    error = %e,
                    "Failed to remove previous thumbnail"
                );
            }
        }

        retry
            .run("upload", StorageError::is_transient, || {
                self.storage
                    .upload_with_key(&key, rendered.bytes.clone(), THUMBNAIL_CONTENT_TYPE)
            })
            .await
            .map_err(|e| ThumbnailError::Upload(e.to_string()))?;

        let url = self.storage.public_url(&key);
        let update = PhotoUpdate::thumbnail(url.clone());

        retry
            .run("persist", BackendError::is_transient, || {
                self.repository.update_photo(&record.id, &update)
            })
            .await
            .map_err(|e| ThumbnailError::Persist(e.to_string()))?;

        Ok(url)
    }

    /// Remove every stored thumbnail. Photo rows are left as they are.
    pub async fn purge_thumbnails(&self) -> Result<PurgeSummary, GeneratorError> {
        let keys = self.storage.list(THUMBNAIL_PREFIX).await?;
        let mut summary = PurgeSummary::default();

        tracing::info!(thumbnails = keys.len(), "Purging thumbnails");

        for key in keys {
            match self.storage.delete(&key).await {
                Ok(()) => {
                    tracing::debug!(key = %key, "Thumbnail removed");
                    summary.removed += 1;
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Failed to remove thumbnail");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            removed = summary.removed,
            failed = summary.failed,
            "Thumbnail purge finished"
        );

        Ok(summary)
    }

    /// Collect every listing page before any record is touched, so updates
    /// made during the run cannot shift the offset window.
    async fn list_records(&self) -> Result<Vec<PhotoRecord>, GeneratorError> {
        let filter = self.options.listing_filter();
        let mut page = Pagination::first(self.options.page_size.clamp(1, MAX_LIST_PAGE_SIZE));
        let mut records = Vec::new();

        loop {
            let rows = self.list_page(&filter, page).await?;
            let short = rows.len() < page.limit;
            records.extend(rows);
            if short {
                break;
            }
            page = page.next();
        }

        Ok(records)
    }

    async fn list_page(
        &self,
        filter: &PhotoFilter,
        page: Pagination,
    ) -> Result<Vec<PhotoRecord>, GeneratorError> {
        let max_attempts = self.options.list_max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.repository.list_photos(filter, page).await {
                Ok(rows) => return Ok(rows),
                Err(e) if e.is_unauthorized() => {
                    tracing::error!(error = %e, "Backend rejected credentials");
                    return Err(GeneratorError::Unauthorized(e.to_string()));
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::error!(attempts = attempt, error = %e, "Giving up listing photos");
                    return Err(GeneratorError::Listing {
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        offset = page.offset,
                        error = %e,
                        "Listing photos failed, retrying"
                    );
                    tokio::time::sleep(self.options.list_retry_delay).await;
                }
            }
        }
    }
}
