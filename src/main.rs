//! podclip CLI entry point.

use anyhow::Result;
use clap::Parser;
use podclip::cli::{commands, Cli, Commands};
use podclip::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("podclip={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Run { once, max_cycles } => {
            commands::run_pipeline(*once, *max_cycles, settings).await?;
        }

        Commands::Chunk { srt, max_chars } => {
            commands::run_chunk(srt, *max_chars, &settings)?;
        }

        Commands::Moments {
            srt,
            title,
            description,
            output,
        } => {
            commands::run_moments(srt, title, description, output.clone(), settings).await?;
        }

        Commands::Excluded { action } => {
            commands::run_excluded(action, &settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
