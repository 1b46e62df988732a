//! Configuration helpers pointing a pipeline at a mock API server

use chrono::{DateTime, TimeZone, Utc};
use entsoe_extract::config::keys;
use entsoe_extract::{Config, HttpFetcher, MemoryBlobStore, Pipeline};
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::MockServer;

/// Token used by every test configuration
pub const TEST_TOKEN: &str = "test-token-0123";

/// Bucket used by every test configuration
pub const TEST_BUCKET: &str = "test-bucket";

/// Wall clock used for object keys in tests
pub fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 8, 16, 4, 30, 15).unwrap()
}

/// Environment-style settings for a mock server, before overrides
pub fn base_settings(server: &MockServer) -> HashMap<String, String> {
    let template = format!(
        "{}/api?documentType={{document_type}}&processType={{process_type}}&in_Domain={{in_domain}}&periodStart={{period_start}}&periodEnd={{period_end}}&securityToken={{api_url_token}}",
        server.uri()
    );

    HashMap::from([
        (keys::API_URL.to_string(), template),
        (keys::API_URL_TOKEN.to_string(), TEST_TOKEN.to_string()),
        (keys::S3_BUCKET.to_string(), TEST_BUCKET.to_string()),
        (keys::HTTP_TIMEOUT_SECS.to_string(), "5".to_string()),
    ])
}

/// Build a [`Config`] for `server`, applying `overrides` on top
pub fn test_config(server: &MockServer, overrides: &[(&str, &str)]) -> Config {
    let mut settings = base_settings(server);
    for (key, value) in overrides {
        settings.insert((*key).to_string(), (*value).to_string());
    }
    Config::from_lookup(|key| settings.get(key).cloned()).unwrap()
}

/// Pipeline over the real HTTP fetcher and an in-memory store
pub fn memory_pipeline(config: Config) -> (Pipeline, MemoryBlobStore) {
    let store = MemoryBlobStore::new();
    let fetcher = HttpFetcher::new(config.api.timeout).unwrap();
    let pipeline =
        Pipeline::new(config, Arc::new(fetcher), Arc::new(store.clone())).with_clock(fixed_clock);
    (pipeline, store)
}
