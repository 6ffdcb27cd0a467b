use album_core::models::{NewPhoto, Pagination, PhotoFilter, PhotoId, PhotoRecord, PhotoUpdate};
use album_core::{BackendError, Config};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::repository::PhotoRepository;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Photo repository backed by the hosted REST table API
///
/// Rows are addressed at `{base_url}/rest/v1/{table}` with filter query
/// parameters (`id=eq.{id}`, `user_id=eq.{owner}`, ...).
#[derive(Clone)]
pub struct HostedPhotoRepository {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl HostedPhotoRepository {
    pub fn new(base_url: &str, api_key: String, table: String) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BackendError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        Self::new(
            &config.backend_url,
            config.backend_key.clone(),
            config.photos_table.clone(),
        )
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
    }

    /// Send a request and decode a JSON body, mapping every failure to `BackendError`.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse rows: {}", e)))
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else {
        BackendError::Request(err.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(BackendError::from_status(status.as_u16(), body))
}

/// Query parameters for a filtered, paginated listing.
fn list_query(filter: &PhotoFilter, page: Pagination) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("select", "*".to_string()),
        ("order", "id.asc".to_string()),
        ("limit", page.limit.to_string()),
        ("offset", page.offset.to_string()),
    ];
    if let Some(owner) = &filter.owner_id {
        query.push(("user_id", format!("eq.{}", owner)));
    }
    if filter.missing_thumbnail {
        // A blank URL counts as missing, same as null.
        query.push(("or", "(thumbnail_url.is.null,thumbnail_url.eq.)".to_string()));
    }
    query
}

#[async_trait]
impl PhotoRepository for HostedPhotoRepository {
    async fn list_photos(
        &self,
        filter: &PhotoFilter,
        page: Pagination,
    ) -> Result<Vec<PhotoRecord>, BackendError> {
        let request = self.client.get(self.table_url()).query(&list_query(filter, page));
        let rows: Vec<PhotoRecord> = self.execute(request).await?;

        tracing::debug!(
            table = %self.table,
            limit = page.limit,
            offset = page.offset,
            rows = rows.len(),
            "Listed photos"
        );

        Ok(rows)
    }

    async fn insert_photo(&self, photo: &NewPhoto) -> Result<PhotoRecord, BackendError> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(photo);
        let rows: Vec<PhotoRecord> = self.execute(request).await?;

        rows.into_iter().next().ok_or_else(|| {
            BackendError::InvalidResponse("Insert returned no rows".to_string())
        })
    }

    async fn update_photo(
        &self,
        id: &PhotoId,
        update: &PhotoUpdate,
    ) -> Result<PhotoRecord, BackendError> {
        if update.is_empty() {
            return Err(BackendError::InvalidRequest(format!(
                "Update for photo {} sets no fields",
                id
            )));
        }

        let request = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(update);
        let rows: Vec<PhotoRecord> = self.execute(request).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("photo {}", id)))
    }
}
