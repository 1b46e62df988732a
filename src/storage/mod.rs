//! Object storage for the CSV output
//!
//! The pipeline writes exactly one object per run through a [`BlobStore`].
//! A write either fully succeeds or leaves no object behind; there is no
//! merge, append, or versioning. Three backends are provided:
//! - [`S3BlobStore`]: Amazon S3 or an S3-compatible service
//! - [`LocalBlobStore`]: a directory tree on the local filesystem
//! - [`MemoryBlobStore`]: an in-process map for tests and dry runs

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;

mod local;
mod memory;
mod s3;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

/// MIME type attached to uploaded objects
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Timestamp layout used in object keys, e.g. `20230816T043015`
pub const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Write-once object storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `body` under `key` in `container`, replacing any existing object
    ///
    /// # Errors
    /// - [`Error::StorageAuth`](crate::Error::StorageAuth) when credentials or
    ///   authorization cannot be established
    /// - [`Error::StorageWrite`](crate::Error::StorageWrite) for every other failure
    async fn put(&self, container: &str, key: &str, body: Vec<u8>) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Build the store selected by the configuration
///
/// # Errors
/// Propagates backend construction failures.
pub async fn from_config(config: &StorageConfig) -> Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.backend {
        StorageBackend::S3 => Arc::new(S3BlobStore::from_config(config).await?),
        StorageBackend::Local => Arc::new(LocalBlobStore::new(&config.local_dir)),
    };
    Ok(store)
}

/// Object key for a run finishing at `now`
///
/// `{prefix}-{YYYYMMDDThhmmss}.csv`, with an 8-digit hex disambiguator before
/// the extension when `unique` is set. Two runs in the same second without
/// the disambiguator produce the same key and the later write wins.
pub fn output_key(prefix: &str, now: DateTime<Utc>, unique: bool) -> String {
    let stamp = now.format(KEY_TIMESTAMP_FORMAT);
    if unique {
        let suffix: u32 = rand::thread_rng().gen_range(0..=u32::MAX);
        format!("{prefix}-{stamp}-{suffix:08x}.csv")
    } else {
        format!("{prefix}-{stamp}.csv")
    }
}
