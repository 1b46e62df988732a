//! Command-line entry point: one run, then exit

use entsoe_extract::{Config, Pipeline, RunReport};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(code = e.code(), "invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match Pipeline::from_config(config).await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!(code = e.code(), "failed to initialise pipeline: {e}");
            return ExitCode::FAILURE;
        }
    };

    match pipeline.run().await {
        Ok(report) => {
            info!(key = %report.key, rows = report.rows, "run finished");
            println!("{}", RunReport::SUCCESS);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(stage = %e.stage, code = e.code(), "{e}");
            ExitCode::FAILURE
        }
    }
}
