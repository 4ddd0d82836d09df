//! gensearch CLI entry point.

use anyhow::Result;
use clap::Parser;
use gensearch::cli::{commands, Cli, Commands};
use gensearch::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // A .env in the working directory fills in variables the environment lacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration, then environment overrides
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| settings.general.log_filter(cli.verbose)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host, port, settings).await?;
        }

        Commands::Ingest { reset } => {
            commands::run_ingest(reset, settings).await?;
        }

        Commands::Generate { prompt } => {
            commands::run_generate(&prompt, settings).await?;
        }

        Commands::Ask {
            question,
            model,
            top_k,
            sources,
        } => {
            commands::run_ask(&question, model, top_k, sources, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, config_path, settings)?;
        }
    }

    Ok(())
}
