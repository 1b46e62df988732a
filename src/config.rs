//! Configuration types for entsoe-extract
//!
//! A [`Config`] is built once at process start and passed by reference into
//! the pipeline; nothing reads the environment after that. Every key is
//! optional and falls back to the defaults below.

use crate::error::{Error, Result};
use crate::types::Invocation;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr, time::Duration};

/// Environment variable names read by [`Config::from_env`]
pub mod keys {
    /// URL template with `{placeholder}` tokens
    pub const API_URL: &str = "API_URL";
    /// Security token substituted for `{api_url_token}`
    pub const API_URL_TOKEN: &str = "API_URL_TOKEN";
    /// Document type code, `{document_type}`
    pub const DOCUMENT_TYPE: &str = "DOCUMENT_TYPE";
    /// Process type code, `{process_type}`
    pub const PROCESS_TYPE: &str = "PROCESS_TYPE";
    /// Bidding zone / control area EIC code, `{in_domain}`
    pub const IN_DOMAIN: &str = "IN_DOMAIN";
    /// Period start, `YYYYMMDDhhmm`
    pub const PERIOD_START: &str = "PERIOD_START";
    /// Period end, `YYYYMMDDhhmm`
    pub const PERIOD_END: &str = "PERIOD_END";
    /// Local XML tag name to extract
    pub const TARGET_KEY: &str = "TARGET_KEY";
    /// Destination bucket
    pub const S3_BUCKET: &str = "S3_BUCKET";
    /// Object key prefix
    pub const OUTPUT_PREFIX: &str = "OUTPUT_PREFIX";
    /// `scalar` or `records`
    pub const OUTPUT_MODE: &str = "OUTPUT_MODE";
    /// Comma-separated tags for `records` mode
    pub const RECORD_FIELDS: &str = "RECORD_FIELDS";
    /// `last-element` or `ancestor-stack`
    pub const TAG_TRACKING: &str = "TAG_TRACKING";
    /// `s3` or `local`
    pub const STORAGE_BACKEND: &str = "STORAGE_BACKEND";
    /// Root directory for the local backend
    pub const LOCAL_STORAGE_DIR: &str = "LOCAL_STORAGE_DIR";
    /// S3-compatible endpoint override
    pub const S3_ENDPOINT_URL: &str = "S3_ENDPOINT_URL";
    /// Region override
    pub const AWS_REGION: &str = "AWS_REGION";
    /// Request timeout in seconds
    pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
    /// Accept a zero-byte response body
    pub const ALLOW_EMPTY_RESPONSE: &str = "ALLOW_EMPTY_RESPONSE";
    /// Append a random suffix to object keys
    pub const UNIQUE_KEYS: &str = "UNIQUE_KEYS";
}

/// Remote API settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// URL template, see [`crate::url_template`]
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Security token for the API
    #[serde(default = "default_token")]
    pub token: String,

    /// Document type code (default: "A71", generation forecast)
    #[serde(default = "default_document_type")]
    pub document_type: String,

    /// Process type code (default: "A01", day ahead)
    #[serde(default = "default_process_type")]
    pub process_type: String,

    /// Area EIC code (default: "10YBE----------2")
    #[serde(default = "default_in_domain")]
    pub in_domain: String,

    /// Period start, fixed-width `YYYYMMDDhhmm`
    #[serde(default = "default_period_start")]
    pub period_start: String,

    /// Period end, fixed-width `YYYYMMDDhhmm`
    #[serde(default = "default_period_end")]
    pub period_end: String,

    /// Request timeout (None = transport default)
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,

    /// Accept a 200 reply with an empty body instead of failing the run
    #[serde(default)]
    pub allow_empty_response: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            token: default_token(),
            document_type: default_document_type(),
            process_type: default_process_type(),
            in_domain: default_in_domain(),
            period_start: default_period_start(),
            period_end: default_period_end(),
            timeout: None,
            allow_empty_response: false,
        }
    }
}

impl ApiConfig {
    /// Placeholder name → value pairs for the URL template
    pub fn url_params(&self) -> [(&str, &str); 6] {
        [
            ("document_type", self.document_type.as_str()),
            ("process_type", self.process_type.as_str()),
            ("in_domain", self.in_domain.as_str()),
            ("period_start", self.period_start.as_str()),
            ("period_end", self.period_end.as_str()),
            ("api_url_token", self.token.as_str()),
        ]
    }
}

/// Shape of the CSV output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// One CSV row holding every value of the target tag
    #[default]
    Scalar,
    /// Header row of field names, then one row per record index
    Records,
}

impl FromStr for OutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(OutputMode::Scalar),
            "records" => Ok(OutputMode::Records),
            other => Err(Error::config(
                keys::OUTPUT_MODE,
                format!("unknown output mode '{other}' (expected scalar or records)"),
            )),
        }
    }
}

/// How the extractor decides which element a piece of text belongs to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagTracking {
    /// Remember only the most recently opened element; any close clears it.
    /// Correct for leaf targets, which is what the API returns.
    #[default]
    LastElement,
    /// Keep a stack of open elements and attribute text to the innermost one
    AncestorStack,
}

impl FromStr for TagTracking {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-element" | "last_element" => Ok(TagTracking::LastElement),
            "ancestor-stack" | "ancestor_stack" => Ok(TagTracking::AncestorStack),
            other => Err(Error::config(
                keys::TAG_TRACKING,
                format!("unknown tag tracking '{other}' (expected last-element or ancestor-stack)"),
            )),
        }
    }
}

/// What to extract and how to lay it out
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Tag whose values are extracted in scalar mode (default: "quantity")
    #[serde(default = "default_target_key")]
    pub target_key: String,

    /// Output layout
    #[serde(default)]
    pub output_mode: OutputMode,

    /// Tags forming one record in records mode (default: position, quantity)
    #[serde(default = "default_record_fields")]
    pub record_fields: Vec<String>,

    /// Element attribution strategy
    #[serde(default)]
    pub tag_tracking: TagTracking,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            target_key: default_target_key(),
            output_mode: OutputMode::default(),
            record_fields: default_record_fields(),
            tag_tracking: TagTracking::default(),
        }
    }
}

impl ExtractionConfig {
    /// Tags the extractor must collect for the configured mode
    pub fn fields(&self) -> Vec<String> {
        match self.output_mode {
            OutputMode::Scalar => vec![self.target_key.clone()],
            OutputMode::Records => self.record_fields.clone(),
        }
    }
}

/// Storage backend selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Amazon S3 or an S3-compatible service
    #[default]
    S3,
    /// Directory on the local filesystem
    Local,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            other => Err(Error::config(
                keys::STORAGE_BACKEND,
                format!("unknown storage backend '{other}' (expected s3 or local)"),
            )),
        }
    }
}

/// Output object settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend to write to
    #[serde(default)]
    pub backend: StorageBackend,

    /// Destination bucket (default: "entsoe-data-bucket")
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Object key prefix (default: "entsoe_data_")
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Root directory for [`StorageBackend::Local`] (default: "./output")
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// Custom S3 endpoint, e.g. MinIO
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Region override; the SDK provider chain decides when unset
    #[serde(default)]
    pub region: Option<String>,

    /// Append a random disambiguator to every object key
    #[serde(default)]
    pub unique_keys: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
            output_prefix: default_output_prefix(),
            local_dir: default_local_dir(),
            endpoint_url: None,
            region: None,
            unique_keys: false,
        }
    }
}

/// Main configuration for a run
///
/// Fields are grouped into sub-configs; the groups are flattened so the
/// serialized form stays a flat map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote API and request settings
    #[serde(flatten)]
    pub api: ApiConfig,

    /// Extraction and CSV layout
    #[serde(flatten)]
    pub extraction: ExtractionConfig,

    /// Output object settings
    #[serde(flatten)]
    pub storage: StorageConfig,
}

impl Config {
    /// Build the configuration from the process environment
    ///
    /// # Errors
    /// Returns [`Error::Config`] when a value is present but unusable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// Absent keys take their default. Present values are used verbatim for
    /// string settings and parsed for typed ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        let api = &mut config.api;
        set_string(&lookup, keys::API_URL, &mut api.url_template);
        set_string(&lookup, keys::API_URL_TOKEN, &mut api.token);
        set_string(&lookup, keys::DOCUMENT_TYPE, &mut api.document_type);
        set_string(&lookup, keys::PROCESS_TYPE, &mut api.process_type);
        set_string(&lookup, keys::IN_DOMAIN, &mut api.in_domain);
        set_string(&lookup, keys::PERIOD_START, &mut api.period_start);
        set_string(&lookup, keys::PERIOD_END, &mut api.period_end);
        if let Some(raw) = lookup(keys::HTTP_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::config(
                    keys::HTTP_TIMEOUT_SECS,
                    format!("'{raw}' is not a whole number of seconds"),
                )
            })?;
            api.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(raw) = lookup(keys::ALLOW_EMPTY_RESPONSE) {
            api.allow_empty_response = parse_bool(keys::ALLOW_EMPTY_RESPONSE, &raw)?;
        }

        let extraction = &mut config.extraction;
        set_string(&lookup, keys::TARGET_KEY, &mut extraction.target_key);
        if let Some(raw) = lookup(keys::OUTPUT_MODE) {
            extraction.output_mode = raw.parse()?;
        }
        if let Some(raw) = lookup(keys::RECORD_FIELDS) {
            extraction.record_fields = raw
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(raw) = lookup(keys::TAG_TRACKING) {
            extraction.tag_tracking = raw.parse()?;
        }

        let storage = &mut config.storage;
        if let Some(raw) = lookup(keys::STORAGE_BACKEND) {
            storage.backend = raw.parse()?;
        }
        set_string(&lookup, keys::S3_BUCKET, &mut storage.bucket);
        set_string(&lookup, keys::OUTPUT_PREFIX, &mut storage.output_prefix);
        if let Some(dir) = lookup(keys::LOCAL_STORAGE_DIR) {
            storage.local_dir = PathBuf::from(dir);
        }
        storage.endpoint_url = lookup(keys::S3_ENDPOINT_URL).filter(|v| !v.trim().is_empty());
        storage.region = lookup(keys::AWS_REGION).filter(|v| !v.trim().is_empty());
        if let Some(raw) = lookup(keys::UNIQUE_KEYS) {
            storage.unique_keys = parse_bool(keys::UNIQUE_KEYS, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.api.url_template.trim().is_empty() {
            return Err(Error::config(keys::API_URL, "URL template must not be empty"));
        }
        if self.extraction.target_key.trim().is_empty() {
            return Err(Error::config(keys::TARGET_KEY, "target tag must not be empty"));
        }
        if self.extraction.output_mode == OutputMode::Records
            && self.extraction.record_fields.is_empty()
        {
            return Err(Error::config(
                keys::RECORD_FIELDS,
                "records mode needs at least one field",
            ));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(Error::config(keys::S3_BUCKET, "bucket must not be empty"));
        }
        Ok(())
    }

    /// Copy of this configuration with the invocation's overrides applied
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a target tag override in records mode,
    /// or when the result fails [`Config::validate`].
    pub fn with_invocation(&self, invocation: &Invocation) -> Result<Self> {
        let mut config = self.clone();
        if let Some(start) = &invocation.period_start {
            config.api.period_start = start.clone();
        }
        if let Some(end) = &invocation.period_end {
            config.api.period_end = end.clone();
        }
        if let Some(target) = &invocation.target_key {
            if config.extraction.output_mode == OutputMode::Records {
                return Err(Error::config(
                    keys::TARGET_KEY,
                    "target tag override has no effect in records mode; set RECORD_FIELDS instead",
                ));
            }
            config.extraction.target_key = target.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn set_string<F>(lookup: &F, key: &str, slot: &mut String)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key) {
        *slot = value;
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::config(key, format!("'{other}' is not a boolean"))),
    }
}

// Default value functions
fn default_url_template() -> String {
    "https://web-api.tp.entsoe.eu/api?documentType={document_type}&processType={process_type}&in_Domain={in_domain}&periodStart={period_start}&periodEnd={period_end}&securityToken={api_url_token}".to_string()
}

fn default_token() -> String {
    "xxxxxx".to_string()
}

fn default_document_type() -> String {
    "A71".to_string()
}

fn default_process_type() -> String {
    "A01".to_string()
}

fn default_in_domain() -> String {
    "10YBE----------2".to_string()
}

fn default_period_start() -> String {
    "202308152200".to_string()
}

fn default_period_end() -> String {
    "202308162200".to_string()
}

fn default_target_key() -> String {
    "quantity".to_string()
}

fn default_record_fields() -> Vec<String> {
    vec!["position".into(), "quantity".into()]
}

fn default_bucket() -> String {
    "entsoe-data-bucket".to_string()
}

fn default_output_prefix() -> String {
    "entsoe_data_".to_string()
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("output")
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
