mod cli;
mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod render;

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info, Subscriber};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::{Config, LogConfig};
use crate::generation::pipeline::Pipeline;

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit here, before configuration or the pipeline
    let cli = Cli::parse();

    // The run log comes first so every later failure, config included, is recorded
    match run_log_subscriber(&LogConfig::from_env()) {
        Ok(subscriber) => subscriber.init(),
        Err(e) => eprintln!("Warning: run log unavailable: {e:#}"),
    }

    match try_main(cli).await {
        Ok(code) => code,
        Err(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

async fn try_main(cli: Cli) -> Result<ExitCode> {
    let config = Config::from_env()?;

    info!("Starting cover-letter v{}", env!("CARGO_PKG_VERSION"));

    let facts = cli.into_facts(Local::now().date_naive());
    let pipeline = Pipeline::from_config(&config).context("Failed to build the HTTP client")?;

    match pipeline.run(&facts).await {
        Ok(artifact) => {
            println!("Cover letter generated: {}", artifact.display());
            info!(
                "Cover letter generated successfully for {}",
                facts.full_name
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(code = e.code(), "Error generating cover letter: {e}");
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Records a failure outside the pipeline (configuration, client setup) and tells the user.
fn report_failure(err: &anyhow::Error) {
    error!("Error generating cover letter: {err:#}");
    eprintln!("An error occurred: {err:#}");
}

/// Structured logging into the append-only run log. Nothing is logged to the console.
fn run_log_subscriber(log: &LogConfig) -> Result<impl Subscriber + Send + Sync + 'static> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log.log_file)
        .with_context(|| format!("Failed to open run log '{}'", log.log_file.display()))?;

    Ok(tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &log.rust_log))
        }))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        ))
}
