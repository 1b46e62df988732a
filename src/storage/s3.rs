//! Amazon S3 object store

use super::{BlobStore, CSV_CONTENT_TYPE};
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, warn};

/// S3 error codes that mean "who you are" or "what you may do" failed
const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "TokenRefreshRequired",
];

/// Writes objects with `PutObject`
///
/// Credentials, region and endpoint come from the standard AWS provider
/// chain (environment, profile, container or instance role). The SDK's own
/// retry layer is disabled: each put is a single attempt.
#[derive(Clone, Debug)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    credentials: Option<SharedCredentialsProvider>,
}

impl S3BlobStore {
    /// Build a client from the storage configuration and the AWS provider chain
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        Ok(Self::from_sdk_config(&sdk_config, config.endpoint_url.as_deref()))
    }

    /// Build a client from an already loaded SDK configuration
    ///
    /// A custom `endpoint` switches to path-style addressing, which
    /// S3-compatible services expect.
    pub fn from_sdk_config(sdk_config: &SdkConfig, endpoint: Option<&str>) -> Self {
        let mut builder =
            aws_sdk_s3::config::Builder::from(sdk_config).retry_config(RetryConfig::disabled());
        if let Some(endpoint) = endpoint {
            debug!(endpoint = %endpoint, "using custom S3 endpoint");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            credentials: sdk_config.credentials_provider(),
        }
    }

    async fn ensure_credentials(&self) -> Result<()> {
        let Some(provider) = &self.credentials else {
            return Err(Error::StorageAuth(
                "no AWS credentials provider is configured".to_string(),
            ));
        };
        provider
            .provide_credentials()
            .await
            .map_err(|e| Error::StorageAuth(format!("unable to load AWS credentials: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, container: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.ensure_credentials().await?;

        let size = body.len();
        self.client
            .put_object()
            .bucket(container)
            .key(key)
            .content_type(CSV_CONTENT_TYPE)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| classify(key, err))?;

        debug!(bucket = container, key, bytes = size, "PutObject succeeded");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

fn classify<E>(key: &str, err: SdkError<E, HttpResponse>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.code().map(str::to_owned);
    let message = DisplayErrorContext(&err).to_string();
    warn!(key, status, code = code.as_deref(), "PutObject failed");

    if is_auth_failure(status, code.as_deref()) {
        Error::StorageAuth(message)
    } else {
        Error::StorageWrite {
            key: key.to_string(),
            reason: message,
        }
    }
}

/// Whether a failed S3 call was rejected for authentication or authorization
pub(crate) fn is_auth_failure(status: Option<u16>, code: Option<&str>) -> bool {
    if code.is_some_and(|c| AUTH_ERROR_CODES.contains(&c)) {
        return true;
    }
    matches!(status, Some(401 | 403))
}
