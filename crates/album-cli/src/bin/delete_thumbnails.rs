use std::process::ExitCode;

use album_cli::{build_generator, exit_code_for, init_tracing, EXIT_CONFIG};
use album_core::Config;
use album_worker::GeneratorOptions;
use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "delete_thumbnails")]
#[command(about = "Remove every stored thumbnail from the photos bucket")]
struct Args {
    /// Required confirmation; nothing is deleted without it
    #[arg(long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();
    if !args.yes {
        eprintln!("Refusing to delete thumbnails without --yes");
        return ExitCode::from(EXIT_CONFIG);
    }

    match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Thumbnail purge could not start");
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

async fn run() -> Result<ExitCode> {
    let config = Config::from_env()?;
    config.validate()?;

    let generator = build_generator(&config, GeneratorOptions::from_config(&config)).await?;

    match generator.purge_thumbnails().await {
        Ok(summary) => {
            println!("{}", summary);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(error = %e, "Thumbnail purge aborted");
            eprintln!("Error: {}", e);
            Ok(ExitCode::from(exit_code_for(&e)))
        }
    }
}
