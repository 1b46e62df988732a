//! Error types for entsoe-extract
//!
//! Every stage of a run reports failures through the single [`Error`] enum.
//! Variants mirror the failure taxonomy of the pipeline:
//! - configuration problems (bad values, unresolvable URL)
//! - HTTP transport failures and non-200 replies
//! - XML parse failures
//! - table shape mismatches
//! - object storage authentication and write failures
//!
//! Nothing is retried or recovered internally. The first error aborts the run
//! and is handed to the caller unchanged, wrapped by the orchestrator in a
//! [`StageError`](crate::pipeline::StageError) that names the failing stage.

use thiserror::Error;

/// Result type alias for entsoe-extract operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for entsoe-extract
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "TARGET_KEY")
        key: Option<String>,
    },

    /// The HTTP request could not be completed (DNS, TCP, TLS, timeout, body read)
    #[error("transport error fetching {url}: {source}")]
    Transport {
        /// URL that was being fetched
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The remote API answered with a status other than 200
    #[error("remote API returned status {status} for {url}")]
    RemoteRequest {
        /// HTTP status code returned by the server
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// The remote API answered 200 with a zero-byte body
    #[error("fetched XML data is empty ({url})")]
    EmptyDocument {
        /// URL that was requested
        url: String,
    },

    /// The document is not well-formed XML
    #[error("XML parsing error at byte {position}: {message}")]
    Parse {
        /// Byte offset in the input where the parser gave up
        position: u64,
        /// Parser diagnostic
        message: String,
    },

    /// Columns handed to the table encoder have unequal lengths
    #[error("column '{column}' has {found} values, expected {expected}")]
    ShapeMismatch {
        /// Name of the first column whose length differs
        column: String,
        /// Length of the first column
        expected: usize,
        /// Length of the offending column
        found: usize,
    },

    /// Credentials or authorization for the object store could not be established
    #[error("storage authentication failed: {0}")]
    StorageAuth(String),

    /// Any other object store failure (network, permission, quota)
    #[error("failed to write object {key}: {reason}")]
    StorageWrite {
        /// Object key that was being written
        key: String,
        /// Why the write failed
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Machine-readable error code
    ///
    /// Stable across releases; used as a structured log field and as the
    /// error type reported to the Lambda runtime.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Transport { .. } => "transport_error",
            Error::RemoteRequest { .. } => "remote_request_error",
            Error::EmptyDocument { .. } => "empty_document",
            Error::Parse { .. } => "parse_error",
            Error::ShapeMismatch { .. } => "shape_mismatch",
            Error::StorageAuth(_) => "storage_auth_error",
            Error::StorageWrite { .. } => "storage_write_error",
            Error::Io(_) => "io_error",
        }
    }

    /// Whether the failure happened while talking to object storage
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::StorageAuth(_) | Error::StorageWrite { .. })
    }
}
