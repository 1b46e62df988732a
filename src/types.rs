//! Core types shared across the pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage
///
/// A run moves through these states strictly in order. Any failure stops the
/// run in the stage that produced it; later stages never execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Substitute configuration values into the URL template
    ResolveUrl,
    /// Single GET against the remote API
    Fetch,
    /// Pull field values out of the XML document
    Extract,
    /// Encode the extracted values as CSV
    Encode,
    /// Write the CSV object to storage
    Upload,
    /// Terminal success state
    Done,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 6] = [
        Stage::ResolveUrl,
        Stage::Fetch,
        Stage::Extract,
        Stage::Encode,
        Stage::Upload,
        Stage::Done,
    ];

    /// The stage that follows this one, `None` once done
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::ResolveUrl => Some(Stage::Fetch),
            Stage::Fetch => Some(Stage::Extract),
            Stage::Extract => Some(Stage::Encode),
            Stage::Encode => Some(Stage::Upload),
            Stage::Upload => Some(Stage::Done),
            Stage::Done => None,
        }
    }

    /// Short lowercase name, used as a log field
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ResolveUrl => "resolve_url",
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Encode => "encode",
            Stage::Upload => "upload",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Storage container the object was written to
    pub bucket: String,
    /// Object key that was written
    pub key: String,
    /// Size of the fetched XML document in bytes
    pub document_bytes: usize,
    /// Number of extracted values (summed over all fields)
    pub values: usize,
    /// Number of CSV rows written, header included
    pub rows: usize,
    /// Size of the uploaded CSV body in bytes
    pub csv_bytes: usize,
}

impl RunReport {
    /// Short success message returned to the invoking harness
    pub const SUCCESS: &'static str = "Success";
}

/// Payload accepted by the Lambda entry point
///
/// Every field is optional. A present field overrides the environment
/// configuration for that invocation only. Other keys are ignored, so trigger
/// envelopes such as EventBridge scheduled events run with the environment
/// configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Override for `PERIOD_START` (`YYYYMMDDhhmm`)
    #[serde(default)]
    pub period_start: Option<String>,

    /// Override for `PERIOD_END` (`YYYYMMDDhhmm`)
    #[serde(default)]
    pub period_end: Option<String>,

    /// Override for `TARGET_KEY`; scalar mode only
    #[serde(default)]
    pub target_key: Option<String>,
}
