//! songplay-etl binary
//!
//! Runs one batch over the configured roots. Configuration comes from
//! `dl.yaml` (or the file named by `SONGPLAY_ETL_CONFIG`) and the
//! environment; there are no command-line flags.

use songplay_etl::{Pipeline, PipelineConfig, Result, RunReport};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match run().await {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(summary) => println!("{summary}"),
            Err(e) => tracing::warn!("Failed to render run summary: {e}"),
        },
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<RunReport> {
    let config = PipelineConfig::load()?;
    tracing::debug!(?config, "Loaded configuration");
    Pipeline::from_config(&config)?.run().await
}
