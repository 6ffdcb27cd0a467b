use std::process::ExitCode;

use album_cli::{build_generator, exit_code_for, init_tracing, render_summary, OutputFormat, EXIT_CONFIG};
use album_core::{Config, SelectionMode, SkipPolicy, ThumbnailMode};
use album_processing::TargetSize;
use album_worker::GeneratorOptions;
use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "generate_thumbnails")]
#[command(about = "Generate missing thumbnails for every photo in the album")]
struct Args {
    /// Regenerate thumbnails even for photos that already have one
    #[arg(long)]
    force: bool,

    /// Only count a thumbnail as present if it lives under thumbnails/
    #[arg(long)]
    strict: bool,

    /// List every photo instead of only those without a thumbnail URL
    #[arg(long)]
    all: bool,

    /// Number of photos processed in parallel (1-16)
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Thumbnail size, e.g. 300x400
    #[arg(long, value_name = "WxH")]
    size: Option<TargetSize>,

    /// cover (crop to exact size) or contain (fit inside, no upscaling)
    #[arg(long)]
    mode: Option<ThumbnailMode>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u8>,

    /// Output format: text or json (default: text)
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if self.strict {
            config.skip_policy = SkipPolicy::PathPattern;
        }
        if self.all {
            config.selection = SelectionMode::All;
        }
        if let Some(concurrency) = self.concurrency {
            config.worker_concurrency = concurrency;
        }
        if let Some(size) = self.size {
            config.thumbnail_width = size.width;
            config.thumbnail_height = size.height;
        }
        if let Some(mode) = self.mode {
            config.thumbnail_mode = mode;
        }
        if let Some(quality) = self.quality {
            config.thumbnail_quality = quality;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Thumbnail generation could not start");
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut config = Config::from_env()?;
    args.apply(&mut config);
    config.validate()?;

    if config.worker_concurrency != config.effective_concurrency() {
        tracing::warn!(
            requested = config.worker_concurrency,
            effective = config.effective_concurrency(),
            "Worker concurrency out of range, clamping"
        );
    }

    let options = GeneratorOptions {
        force: args.force,
        ..GeneratorOptions::from_config(&config)
    };
    let generator = build_generator(&config, options).await?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight photos");
            on_signal.cancel();
        }
    });

    match generator.process_all(&cancel).await {
        Ok(summary) => {
            println!("{}", render_summary(&summary, args.format)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(error = %e, "Thumbnail generation aborted");
            eprintln!("Error: {}", e);
            Ok(ExitCode::from(exit_code_for(&e)))
        }
    }
}
