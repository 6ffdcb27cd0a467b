//! Shared plumbing for the album command-line tools.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use album_core::Config;
use album_db::HostedPhotoRepository;
use album_storage::create_storage;
use album_worker::{GeneratorError, GeneratorOptions, ImageFetcher, RunSummary, ThumbnailGenerator};
use anyhow::{anyhow, Context, Result};

/// Exit status for configuration and startup failures
pub const EXIT_CONFIG: u8 = 1;
/// Exit status when photos could not be listed
pub const EXIT_LISTING: u8 = 2;
/// Exit status when the backend rejected the credentials
pub const EXIT_UNAUTHORIZED: u8 = 3;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Wire the hosted repository, the configured storage backend and the fetcher.
pub async fn build_generator(config: &Config, options: GeneratorOptions) -> Result<ThumbnailGenerator> {
    let repository = HostedPhotoRepository::from_config(config)
        .context("Failed to create photo repository client")?;
    let storage = create_storage(config)
        .await
        .context("Failed to create storage backend")?;
    let fetcher = ImageFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
        .context("Failed to create image fetcher")?;

    Ok(ThumbnailGenerator::new(
        Arc::new(repository),
        storage,
        fetcher,
        options,
    ))
}

pub fn exit_code_for(err: &GeneratorError) -> u8 {
    match err {
        GeneratorError::Unauthorized(_) => EXIT_UNAUTHORIZED,
        GeneratorError::Listing { .. } | GeneratorError::StorageListing(_) => EXIT_LISTING,
    }
}

/// How run results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Invalid output format: {}", s)),
        }
    }
}

pub fn render_summary(summary: &RunSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(summary.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
    }
}
