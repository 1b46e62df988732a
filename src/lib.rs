//! # entsoe-extract
//!
//! Fetches a market document from the ENTSO-E transparency platform, pulls
//! the values of one or more XML elements out of it, and stores them as a
//! CSV object.
//!
//! ## Design Philosophy
//!
//! entsoe-extract is designed to be:
//! - **One-shot** - Each run is a single fetch, extract, encode, upload pass
//! - **Fail fast** - The first error ends the run; nothing is retried
//! - **Environment-configured** - Every setting has a default and an env override
//! - **Pluggable at the edges** - Document sources and object stores are traits
//!
//! ## Quick Start
//!
//! ```no_run
//! use entsoe_extract::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let pipeline = Pipeline::from_config(config).await?;
//!
//!     let report = pipeline.run().await?;
//!     println!("wrote s3://{}/{}", report.bucket, report.key);
//!
//!     Ok(())
//! }
//! ```
//!
//! The extractor can also be used on its own:
//!
//! ```
//! use entsoe_extract::extract_values;
//!
//! let xml = b"<Point><quantity>5929</quantity></Point><Point><quantity>6628</quantity></Point>";
//! assert_eq!(extract_values(xml, "quantity").unwrap(), vec!["5929", "6628"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Streaming XML value extraction
pub mod extract;
/// Remote document retrieval
pub mod fetch;
/// Run orchestration
pub mod pipeline;
/// Object storage backends
pub mod storage;
/// CSV table encoding
pub mod table;
/// Core types shared across modules
pub mod types;
/// URL template substitution
pub mod url_template;

// Re-export commonly used types
pub use config::{
    ApiConfig, Config, ExtractionConfig, OutputMode, StorageBackend, StorageConfig, TagTracking,
};
pub use error::{Error, Result};
pub use extract::{Column, Extractor, extract_values};
pub use fetch::{DocumentSource, HttpFetcher};
pub use pipeline::{Pipeline, StageError};
pub use storage::{BlobStore, LocalBlobStore, MemoryBlobStore, S3BlobStore};
pub use table::Table;
pub use types::{Invocation, RunReport, Stage};
