//! AWS Lambda entry point
//!
//! The environment is read and the HTTP and storage clients are built once
//! at cold start. Each invocation may override the period and target tag
//! through its payload; an empty or `null` payload, or a trigger envelope
//! such as a scheduled event, runs with the environment configuration.

use entsoe_extract::{Config, Invocation, Pipeline, RunReport};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

async fn handle(base: &Pipeline, event: LambdaEvent<Option<Invocation>>) -> Result<String, Error> {
    let invocation = event.payload.unwrap_or_default();
    info!(request_id = %event.context.request_id, ?invocation, "invocation received");

    let config = base.config().with_invocation(&invocation)?;
    let pipeline = base.with_config(config);

    match pipeline.run().await {
        Ok(report) => {
            info!(key = %report.key, rows = report.rows, "run finished");
            Ok(RunReport::SUCCESS.to_string())
        }
        Err(e) => {
            error!(stage = %e.stage, code = e.code(), "{e}");
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .without_time()
        .with_target(false)
        .init();

    let base = Pipeline::from_config(Config::from_env()?).await?;
    run(service_fn(move |event| {
        let base = base.clone();
        async move { handle(&base, event).await }
    }))
    .await
}
