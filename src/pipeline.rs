//! Run orchestration
//!
//! A run walks the stages `ResolveUrl → Fetch → Extract → Encode → Upload →
//! Done` in order. Each transition happens only if the previous stage
//! succeeded; the first error stops the run and is returned as a
//! [`StageError`] naming the stage it came from. Nothing is retried and
//! nothing is written unless every earlier stage succeeded.

use crate::config::{Config, OutputMode};
use crate::error::{Error, Result};
use crate::extract::Extractor;
use crate::fetch::{DocumentSource, HttpFetcher, redact_token};
use crate::storage::{self, BlobStore};
use crate::table::Table;
use crate::types::{RunReport, Stage};
use crate::url_template;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// A run that stopped before reaching [`Stage::Done`]
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    /// Stage in which the failure happened
    pub stage: Stage,
    /// The originating error, unchanged
    #[source]
    pub source: Error,
}

impl StageError {
    /// Machine-readable code of the originating error
    pub fn code(&self) -> &'static str {
        self.source.code()
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Fetch → extract → encode → upload, once per call to [`Pipeline::run`]
#[derive(Clone)]
pub struct Pipeline {
    config: Config,
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn BlobStore>,
    clock: Clock,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("source", &self.source.name())
            .field("store", &self.store.name())
            .finish()
    }
}

impl Pipeline {
    /// Pipeline over explicit collaborators
    pub fn new(config: Config, source: Arc<dyn DocumentSource>, store: Arc<dyn BlobStore>) -> Self {
        Self {
            config,
            source,
            store,
            clock: Arc::new(Utc::now),
        }
    }

    /// Pipeline with the HTTP fetcher and the configured storage backend
    ///
    /// # Errors
    /// Fails if the HTTP client or the storage client cannot be created.
    pub async fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let source = Arc::new(HttpFetcher::new(config.api.timeout)?);
        let store = storage::from_config(&config.storage).await?;
        Ok(Self::new(config, source, store))
    }

    /// Replace the wall clock used for object keys
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Same collaborators and clock, different configuration
    ///
    /// Only settings read per run take effect: URL, extraction and object
    /// key. The HTTP client and storage backend were built from the
    /// original configuration and are shared.
    pub fn with_config(&self, config: Config) -> Self {
        Self {
            config,
            ..self.clone()
        }
    }

    /// Configuration this pipeline runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute one complete run
    ///
    /// # Errors
    /// Returns the first failure together with the stage it occurred in.
    pub async fn run(&self) -> std::result::Result<RunReport, StageError> {
        let mut progress = Progress::start();

        let url = url_template::resolve_url(
            &self.config.api.url_template,
            &self.config.api.url_params(),
        )
        .map_err(|e| progress.fail(e))?;
        debug!(url = %redact_token(url.as_str()), "resolved API URL");

        progress.advance();
        let document = self
            .source
            .fetch(url.as_str())
            .await
            .map_err(|e| progress.fail(e))?;
        info!(bytes = document.len(), "Size of fetched XML data: {} bytes", document.len());
        if document.is_empty() && !self.config.api.allow_empty_response {
            return Err(progress.fail(Error::EmptyDocument {
                url: redact_token(url.as_str()),
            }));
        }

        progress.advance();
        let extractor = Extractor::new(self.config.extraction.fields())
            .with_tracking(self.config.extraction.tag_tracking);
        let columns = extractor
            .extract(&document)
            .map_err(|e| progress.fail(e))?;
        let document_bytes = document.len();
        drop(document);
        let values: usize = columns.iter().map(|c| c.len()).sum();
        info!(values, "extracted values");

        progress.advance();
        let table = match self.config.extraction.output_mode {
            OutputMode::Scalar => {
                let values = columns
                    .into_iter()
                    .next()
                    .map(|c| c.values)
                    .unwrap_or_default();
                Table::single_row(values)
            }
            OutputMode::Records => Table::from_columns(&columns).map_err(|e| progress.fail(e))?,
        };
        let csv = table.to_csv().map_err(|e| progress.fail(e))?;
        let csv_bytes = csv.len();
        debug!(rows = table.len(), bytes = csv_bytes, "encoded CSV");

        progress.advance();
        let storage = &self.config.storage;
        let key = storage::output_key(&storage.output_prefix, (self.clock)(), storage.unique_keys);
        self.store
            .put(&storage.bucket, &key, csv)
            .await
            .map_err(|e| progress.fail(e))?;
        info!(
            store = self.store.name(),
            bucket = %storage.bucket,
            key = %key,
            "Data uploaded to {}: {key}",
            self.store.name()
        );

        progress.advance();
        Ok(RunReport {
            bucket: storage.bucket.clone(),
            key,
            document_bytes,
            values,
            rows: table.len(),
            csv_bytes,
        })
    }
}

/// Stage bookkeeping for a single run
struct Progress {
    stage: Stage,
}

impl Progress {
    fn start() -> Self {
        info!(stage = %Stage::ResolveUrl, "starting run");
        Self {
            stage: Stage::ResolveUrl,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            debug!(from = %self.stage, to = %next, "stage transition");
            self.stage = next;
        }
        if self.stage == Stage::Done {
            info!(stage = %self.stage, "run complete");
        }
    }

    fn fail(&self, source: Error) -> StageError {
        error!(stage = %self.stage, code = source.code(), error = %source, "run failed");
        StageError {
            stage: self.stage,
            source,
        }
    }
}
