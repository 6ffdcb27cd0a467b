//! Bucket API of the hosted backend.
//!
//! Objects live at `{base_url}/storage/v1/object/{bucket}/{key}` and are
//! publicly readable at `{base_url}/storage/v1/object/public/{bucket}/{key}`.

use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const LIST_PAGE_SIZE: usize = 100;
/// Marker object the bucket API creates for empty folders.
const FOLDER_PLACEHOLDER: &str = ".emptyFolderPlaceholder";

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
    /// Null for folders
    #[serde(default)]
    id: Option<String>,
}

/// Hosted bucket storage implementation
#[derive(Clone)]
pub struct HostedStorage {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl HostedStorage {
    /// Create a new HostedStorage instance
    ///
    /// # Arguments
    /// * `base_url` - Project URL of the hosted backend (e.g. "https://xyz.supabase.co")
    /// * `api_key` - Access key sent as `apikey` and bearer token
    /// * `bucket` - Bucket name (e.g. "photos")
    pub fn new(base_url: &str, api_key: String, bucket: String) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HostedStorage {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            bucket,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            encode_key(key)
        )
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> StorageResult<Response> {
        self.apply_auth(request)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

/// Percent-encode each path segment, keeping the `/` separators.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Translate a non-success response into a storage error.
///
/// `failed` builds the operation-specific variant for statuses that are
/// neither auth, missing-object, nor transient.
async fn status_error(
    response: Response,
    key: &str,
    failed: fn(String) -> StorageError,
) -> StorageError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Unauthorized(body),
        StatusCode::NOT_FOUND => StorageError::NotFound(key.to_string()),
        StatusCode::TOO_MANY_REQUESTS => {
            StorageError::Unavailable(format!("status {}: {}", status, body))
        }
        s if s.is_server_error() => StorageError::Unavailable(format!("status {}: {}", s, body)),
        s => failed(format!("{} (status {}): {}", key, s, body)),
    }
}

#[async_trait]
impl Storage for HostedStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let request = self
            .client
            .post(self.object_url(storage_key))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(data);
        let response = self.send(request).await?;

        if !response.status().is_success() {
            let err = status_error(response, storage_key, StorageError::UploadFailed).await;
            tracing::error!(
                error = %err,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Hosted storage upload failed"
            );
            return Err(err);
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Hosted storage upload successful"
        );

        Ok(self.public_url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        validate_key(storage_key)?;

        let response = self
            .send(self.client.get(self.object_url(storage_key)))
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response, storage_key, StorageError::DownloadFailed).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        validate_key(storage_key)?;

        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let request = self
            .client
            .delete(url)
            .json(&json!({ "prefixes": [storage_key] }));
        let response = self.send(request).await?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Ok(()),
            _ => return Err(status_error(response, storage_key, StorageError::DeleteFailed).await),
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            "Hosted storage delete successful"
        );

        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let prefix = prefix.trim_end_matches('/');
        validate_key(prefix)?;

        let url = format!("{}/storage/v1/object/list/{}", self.base_url, self.bucket);
        let mut keys = Vec::new();
        let mut offset = 0;

        loop {
            let request = self.client.post(&url).json(&json!({
                "prefix": prefix,
                "limit": LIST_PAGE_SIZE,
                "offset": offset,
                "sortBy": { "column": "name", "order": "asc" },
            }));
            let response = self.send(request).await?;

            if !response.status().is_success() {
                return Err(status_error(response, prefix, StorageError::ListFailed).await);
            }

            let page: Vec<ListedObject> = response
                .json()
                .await
                .map_err(|e| StorageError::ListFailed(format!("Invalid list response: {}", e)))?;
            let page_len = page.len();

            keys.extend(
                page.into_iter()
                    .filter(|obj| obj.id.is_some() && obj.name != FOLDER_PLACEHOLDER)
                    .map(|obj| format!("{}/{}", prefix, obj.name)),
            );

            if page_len < LIST_PAGE_SIZE {
                break;
            }
            offset += page_len;
        }

        Ok(keys)
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            encode_key(storage_key)
        )
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Hosted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn storage_for(server: &mockito::Server) -> HostedStorage {
        HostedStorage::new(&server.url(), "test-key".to_string(), "photos".to_string()).unwrap()
    }

    #[test]
    fn test_public_url_layout() {
        let storage = HostedStorage::new(
            "https://project.example.co/",
            "k".to_string(),
            "photos".to_string(),
        )
        .unwrap();

        assert_eq!(
            storage.public_url("thumbnails/p1.jpg"),
            "https://project.example.co/storage/v1/object/public/photos/thumbnails/p1.jpg"
        );
        assert_eq!(
            storage.public_url("thumbnails/a b.jpg"),
            "https://project.example.co/storage/v1/object/public/photos/thumbnails/a%20b.jpg"
        );
    }

    #[tokio::test]
    async fn test_upload_sends_upsert_and_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/storage/v1/object/photos/thumbnails/p1.jpg")
            .match_header("apikey", "test-key")
            .match_header("authorization", "Bearer test-key")
            .match_header("x-upsert", "true")
            .match_header("content-type", "image/jpeg")
            .match_body(Matcher::Exact("jpeg".to_string()))
            .with_status(200)
            .with_body(r#"{"Key":"photos/thumbnails/p1.jpg"}"#)
            .create_async()
            .await;

        let storage = storage_for(&server);
        let url = storage
            .upload_with_key("thumbnails/p1.jpg", b"jpeg".to_vec(), "image/jpeg")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            url,
            format!(
                "{}/storage/v1/object/public/photos/thumbnails/p1.jpg",
                server.url()
            )
        );
    }

    #[tokio::test]
    async fn test_upload_status_mapping() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/storage/v1/object/photos/thumbnails/denied.jpg")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;
        server
            .mock("POST", "/storage/v1/object/photos/thumbnails/busy.jpg")
            .with_status(503)
            .create_async()
            .await;
        server
            .mock("POST", "/storage/v1/object/photos/thumbnails/bad.jpg")
            .with_status(400)
            .with_body("payload too large")
            .create_async()
            .await;

        let storage = storage_for(&server);

        let err = storage
            .upload_with_key("thumbnails/denied.jpg", vec![1], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unauthorized(_)));

        let err = storage
            .upload_with_key("thumbnails/busy.jpg", vec![1], "image/jpeg")
            .await
            .unwrap_err();
        assert!(err.is_transient());

        let err = storage
            .upload_with_key("thumbnails/bad.jpg", vec![1], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_delete_sends_prefixes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/storage/v1/object/photos")
            .match_body(Matcher::Json(
                json!({ "prefixes": ["thumbnails/p1.jpg"] }),
            ))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let storage = storage_for(&server);
        storage.delete("thumbnails/p1.jpg").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_skips_folders_and_placeholders() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/storage/v1/object/list/photos")
            .match_body(Matcher::PartialJson(json!({ "prefix": "thumbnails" })))
            .with_status(200)
            .with_body(
                json!([
                    { "name": "p1.jpg", "id": "obj-1" },
                    { "name": "nested", "id": null },
                    { "name": ".emptyFolderPlaceholder", "id": "obj-0" },
                    { "name": "p2.jpg", "id": "obj-2" }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let storage = storage_for(&server);
        let keys = storage.list("thumbnails/").await.unwrap();

        assert_eq!(keys, vec!["thumbnails/p1.jpg", "thumbnails/p2.jpg"]);
    }

    #[tokio::test]
    async fn test_invalid_key_rejected_before_request() {
        let storage = HostedStorage::new(
            "http://127.0.0.1:9",
            "k".to_string(),
            "photos".to_string(),
        )
        .unwrap();

        let err = storage
            .upload_with_key("../secrets", vec![], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
