//! Configuration module
//!
//! Everything the thumbnail tools need is read once from the environment into
//! [`Config`] and passed explicitly to the clients and the generator.

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context};

use crate::constants::{
    DEFAULT_PHOTOS_BUCKET, DEFAULT_PHOTOS_TABLE, MAX_LIST_PAGE_SIZE, MAX_WORKER_CONCURRENCY,
};
use crate::storage_types::StorageBackend;

const THUMBNAIL_WIDTH: u32 = 300;
const THUMBNAIL_HEIGHT: u32 = 400;
const THUMBNAIL_QUALITY: u8 = 90;
const WORKER_CONCURRENCY: usize = 4;
const FETCH_TIMEOUT_SECS: u64 = 30;
const TRANSFER_MAX_RETRIES: u32 = 2;
const LIST_MAX_ATTEMPTS: u32 = 3;
const LIST_RETRY_DELAY_SECS: u64 = 2;
const LIST_PAGE_SIZE: usize = 500;

/// How a source image is fitted into the thumbnail box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailMode {
    /// Scale to cover the box, then center-crop to its exact size
    #[default]
    Cover,
    /// Scale to fit inside the box, never upscaling
    Contain,
}

impl FromStr for ThumbnailMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cover" | "crop" => Ok(ThumbnailMode::Cover),
            "contain" | "fit" => Ok(ThumbnailMode::Contain),
            _ => Err(anyhow!("Invalid thumbnail mode: {}", s)),
        }
    }
}

/// Rule deciding whether an existing `thumbnail_url` counts as processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipPolicy {
    /// Any present URL marks the photo as processed
    #[default]
    Presence,
    /// The URL must also point below the `thumbnails/` prefix
    PathPattern,
}

impl FromStr for SkipPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "presence" => Ok(SkipPolicy::Presence),
            "path" | "strict" => Ok(SkipPolicy::PathPattern),
            _ => Err(anyhow!("Invalid skip policy: {}", s)),
        }
    }
}

/// Which photo rows the listing asks the backend for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Only rows whose `thumbnail_url` is null
    #[default]
    Missing,
    All,
}

impl FromStr for SelectionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "missing" => Ok(SelectionMode::Missing),
            "all" => Ok(SelectionMode::All),
            _ => Err(anyhow!("Invalid selection mode: {}", s)),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    // Hosted backend
    pub backend_url: String,
    pub backend_key: String,
    pub photos_table: String,
    pub photos_bucket: String,
    // Storage
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Thumbnail rendering
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub thumbnail_mode: ThumbnailMode,
    pub thumbnail_quality: u8,
    pub skip_policy: SkipPolicy,
    pub selection: SelectionMode,
    // Worker behaviour
    pub worker_concurrency: usize,
    pub fetch_timeout_secs: u64,
    pub transfer_max_retries: u32,
    pub list_max_attempts: u32,
    pub list_retry_delay_secs: u64,
    pub list_page_size: usize,
}

// The access key must never reach a log line.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("backend_url", &self.backend_url)
            .field("backend_key", &"<redacted>")
            .field("photos_table", &self.photos_table)
            .field("photos_bucket", &self.photos_bucket)
            .field("storage_backend", &self.storage_backend)
            .field("local_storage_path", &self.local_storage_path)
            .field("local_storage_base_url", &self.local_storage_base_url)
            .field("thumbnail_width", &self.thumbnail_width)
            .field("thumbnail_height", &self.thumbnail_height)
            .field("thumbnail_mode", &self.thumbnail_mode)
            .field("thumbnail_quality", &self.thumbnail_quality)
            .field("skip_policy", &self.skip_policy)
            .field("selection", &self.selection)
            .field("worker_concurrency", &self.worker_concurrency)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("transfer_max_retries", &self.transfer_max_retries)
            .field("list_max_attempts", &self.list_max_attempts)
            .field("list_retry_delay_secs", &self.list_retry_delay_secs)
            .field("list_page_size", &self.list_page_size)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend_url = var("SUPABASE_URL")
            .or_else(|| var("BACKEND_URL"))
            .context("Missing backend URL. Set SUPABASE_URL or BACKEND_URL")?
            .trim_end_matches('/')
            .to_string();

        let backend_key = var("SUPABASE_KEY")
            .or_else(|| var("BACKEND_KEY"))
            .context("Missing backend key. Set SUPABASE_KEY or BACKEND_KEY")?;

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Hosted,
        };

        let config = Config {
            backend_url,
            backend_key,
            photos_table: var("PHOTOS_TABLE").unwrap_or_else(|| DEFAULT_PHOTOS_TABLE.to_string()),
            photos_bucket: var("PHOTOS_BUCKET")
                .unwrap_or_else(|| DEFAULT_PHOTOS_BUCKET.to_string()),
            storage_backend,
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
            thumbnail_width: parse_or(&var, "THUMBNAIL_WIDTH", THUMBNAIL_WIDTH)?,
            thumbnail_height: parse_or(&var, "THUMBNAIL_HEIGHT", THUMBNAIL_HEIGHT)?,
            thumbnail_mode: parse_or(&var, "THUMBNAIL_MODE", ThumbnailMode::default())?,
            thumbnail_quality: parse_or(&var, "THUMBNAIL_QUALITY", THUMBNAIL_QUALITY)?,
            skip_policy: parse_or(&var, "THUMBNAIL_SKIP_POLICY", SkipPolicy::default())?,
            selection: parse_or(&var, "THUMBNAIL_SELECTION", SelectionMode::default())?,
            worker_concurrency: parse_or(&var, "WORKER_CONCURRENCY", WORKER_CONCURRENCY)?,
            fetch_timeout_secs: parse_or(&var, "FETCH_TIMEOUT_SECS", FETCH_TIMEOUT_SECS)?,
            transfer_max_retries: parse_or(&var, "TRANSFER_MAX_RETRIES", TRANSFER_MAX_RETRIES)?,
            list_max_attempts: parse_or(&var, "LIST_MAX_ATTEMPTS", LIST_MAX_ATTEMPTS)?,
            list_retry_delay_secs: parse_or(&var, "LIST_RETRY_DELAY_SECS", LIST_RETRY_DELAY_SECS)?,
            list_page_size: parse_or(&var, "LIST_PAGE_SIZE", LIST_PAGE_SIZE)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            return Err(anyhow!("SUPABASE_URL must be an http(s) URL"));
        }

        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            return Err(anyhow!(
                "THUMBNAIL_WIDTH and THUMBNAIL_HEIGHT must be greater than zero"
            ));
        }

        if !(1..=100).contains(&self.thumbnail_quality) {
            return Err(anyhow!("THUMBNAIL_QUALITY must be between 1 and 100"));
        }

        if self.worker_concurrency == 0 {
            return Err(anyhow!("WORKER_CONCURRENCY must be at least 1"));
        }

        if self.list_max_attempts == 0 {
            return Err(anyhow!("LIST_MAX_ATTEMPTS must be at least 1"));
        }

        if self.list_page_size == 0 || self.list_page_size > MAX_LIST_PAGE_SIZE {
            return Err(anyhow!(
                "LIST_PAGE_SIZE must be between 1 and {}",
                MAX_LIST_PAGE_SIZE
            ));
        }

        if self.storage_backend == StorageBackend::Local
            && (self.local_storage_path.is_none() || self.local_storage_base_url.is_none())
        {
            return Err(anyhow!(
                "STORAGE_BACKEND=local requires LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL"
            ));
        }

        Ok(())
    }

    /// Worker pool size, clamped to the supported range.
    pub fn effective_concurrency(&self) -> usize {
        self.worker_concurrency.clamp(1, MAX_WORKER_CONCURRENCY)
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value for {}: {} ({})", key, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SUPABASE_URL", "https://project.example.co/"),
            ("SUPABASE_KEY", "secret-key"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&minimal())).unwrap();

        assert_eq!(config.backend_url, "https://project.example.co");
        assert_eq!(config.photos_bucket, "photos");
        assert_eq!(config.photos_table, "photos");
        assert_eq!(config.storage_backend, StorageBackend::Hosted);
        assert_eq!((config.thumbnail_width, config.thumbnail_height), (300, 400));
        assert_eq!(config.thumbnail_mode, ThumbnailMode::Cover);
        assert_eq!(config.thumbnail_quality, 90);
        assert_eq!(config.skip_policy, SkipPolicy::Presence);
        assert_eq!(config.selection, SelectionMode::Missing);
        assert_eq!(config.worker_concurrency, 4);
        assert_eq!(config.list_max_attempts, 3);
        assert_eq!(config.list_retry_delay_secs, 2);
    }

    #[test]
    fn test_missing_credentials() {
        let err = Config::from_lookup(lookup(&[("SUPABASE_URL", "https://x.example")]))
            .unwrap_err();
        assert!(err.to_string().contains("SUPABASE_KEY"));

        let err = Config::from_lookup(lookup(&[("SUPABASE_KEY", "k")])).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = minimal();
        pairs.extend([
            ("THUMBNAIL_WIDTH", "300"),
            ("THUMBNAIL_HEIGHT", "300"),
            ("THUMBNAIL_MODE", "contain"),
            ("THUMBNAIL_SKIP_POLICY", "path"),
            ("THUMBNAIL_SELECTION", "all"),
            ("WORKER_CONCURRENCY", "64"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.thumbnail_mode, ThumbnailMode::Contain);
        assert_eq!(config.skip_policy, SkipPolicy::PathPattern);
        assert_eq!(config.selection, SelectionMode::All);
        assert_eq!(config.effective_concurrency(), MAX_WORKER_CONCURRENCY);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut pairs = minimal();
        pairs.push(("THUMBNAIL_QUALITY", "0"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = minimal();
        pairs.push(("THUMBNAIL_WIDTH", "wide"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("THUMBNAIL_WIDTH"));

        let mut pairs = minimal();
        pairs.push(("STORAGE_BACKEND", "local"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_page_size_above_server_cap_rejected() {
        let mut pairs = minimal();
        pairs.push(("LIST_PAGE_SIZE", "1000"));
        assert_eq!(Config::from_lookup(lookup(&pairs)).unwrap().list_page_size, 1000);

        let mut pairs = minimal();
        pairs.push(("LIST_PAGE_SIZE", "1001"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("LIST_PAGE_SIZE"));

        let mut pairs = minimal();
        pairs.push(("LIST_PAGE_SIZE", "0"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_lookup(lookup(&minimal())).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("<redacted>"));
    }
}
