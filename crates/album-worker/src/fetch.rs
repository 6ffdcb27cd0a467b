use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

/// Failure while downloading a source image
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid source URL: {0}")]
    InvalidUrl(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("source returned HTTP {status}")]
    Status { status: u16 },
}

impl FetchError {
    /// Connection problems, timeouts, 429 and 5xx may clear up on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout(_) | FetchError::Transport(_) => true,
            FetchError::Status { status } => *status == 429 || *status >= 500,
            FetchError::InvalidUrl(_) => false,
        }
    }
}

/// Downloads source images over HTTP(S)
#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::InvalidUrl("empty URL".to_string()));
        }

        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(classify)?;
        Ok(body.to_vec())
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_builder() {
        FetchError::InvalidUrl(err.to_string())
    } else if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> ImageFetcher {
        ImageFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/img/1.jpg")
            .with_status(200)
            .with_body(b"\xFF\xD8bytes")
            .create_async()
            .await;

        let data = fetcher()
            .fetch(&format!("{}/img/1.jpg", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(data, b"\xFF\xD8bytes");
    }

    #[tokio::test]
    async fn test_fetch_status_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing.jpg")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/busy.jpg")
            .with_status(503)
            .create_async()
            .await;

        let err = fetcher()
            .fetch(&format!("{}/missing.jpg", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404 }));
        assert!(!err.is_transient());

        let err = fetcher()
            .fetch(&format!("{}/busy.jpg", server.url()))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));

        let err = fetcher().fetch("  ").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        assert!(!err.is_transient());
    }
}
