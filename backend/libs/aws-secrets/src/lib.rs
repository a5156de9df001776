//! AWS Secrets Manager integration library
//!
//! Thin, uncached access to AWS Secrets Manager:
//! - Static access-key credentials scoped to an explicit region
//! - One `GetSecretValue` round-trip per call for the `AWSCURRENT` version
//! - No retries; every call is bounded by an operation timeout
//! - Store failures classified into [`SecretError`] without echoing payloads
//!
//! # Example
//!
//! ```no_run
//! use aws_secrets::{SecretManager, SecretStoreConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SecretStoreConfig::new("us-east-1", "AKIA...", "secret")
//!         .with_timeout(Duration::from_secs(5));
//!     let manager = SecretManager::with_static_credentials(&config).await;
//!
//!     let pem = manager.get_secret("prod/github-app/private-key").await?;
//!     Ok(())
//! }
//! ```

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::config::Credentials;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use aws_sdk_secretsmanager::Client as SecretsClient;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Version stage that always points at the live secret value
pub const CURRENT_VERSION_STAGE: &str = "AWSCURRENT";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Access denied to secret: {0}")]
    AccessDenied(String),

    #[error("Secret decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid secret format: {0}")]
    InvalidFormat(String),

    #[error("Secret lookup timed out: {0}")]
    Timeout(String),

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

/// Connection settings for the secret store
#[derive(Clone)]
pub struct SecretStoreConfig {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Overrides the regional endpoint (LocalStack, test stubs)
    pub endpoint_url: Option<String>,
    pub timeout: Duration,
}

impl SecretStoreConfig {
    pub fn new(
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            endpoint_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for SecretStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStoreConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("endpoint_url", &self.endpoint_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// AWS Secrets Manager client
///
/// Holds no secret values. Each [`SecretManager::get_secret`] call goes to the store.
#[derive(Clone, Debug)]
pub struct SecretManager {
    client: SecretsClient,
}

impl SecretManager {
    /// Create a client authenticated with static access-key credentials
    ///
    /// Retries are disabled and the whole operation (including connect) is
    /// bounded by `config.timeout`.
    pub async fn with_static_credentials(config: &SecretStoreConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "static",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.timeout)
                    .build(),
            );

        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.clone());
        }

        let sdk_config = loader.load().await;

        info!(
            region = %config.region,
            timeout = ?config.timeout,
            custom_endpoint = config.endpoint_url.is_some(),
            "Initialized AWS Secrets Manager client"
        );

        Self {
            client: SecretsClient::new(&sdk_config),
        }
    }

    /// Fetch the current string value of a secret
    pub async fn get_secret(&self, secret_name: &str) -> Result<String, SecretError> {
        debug!(secret_name = %secret_name, "Fetching secret from AWS Secrets Manager");

        let response = self
            .client
            .get_secret_value()
            .secret_id(secret_name)
            .version_stage(CURRENT_VERSION_STAGE)
            .send()
            .await
            .map_err(|e| classify_error(secret_name, e))?;

        let secret_string = response
            .secret_string()
            .ok_or_else(|| SecretError::InvalidFormat(format!("{} is binary, not string", secret_name)))?
            .to_string();

        info!(
            secret_name = %secret_name,
            version_id = ?response.version_id(),
            "Secret fetched from AWS Secrets Manager"
        );

        Ok(secret_string)
    }
}

fn classify_error<R>(secret_name: &str, err: SdkError<GetSecretValueError, R>) -> SecretError
where
    R: fmt::Debug + Send + Sync + 'static,
{
    let error = match err {
        SdkError::ServiceError(context) => {
            let service_error = context.into_err();
            match service_error.code() {
                Some("ResourceNotFoundException") => SecretError::NotFound(secret_name.to_string()),
                Some("AccessDeniedException") => SecretError::AccessDenied(secret_name.to_string()),
                Some("DecryptionFailure") => SecretError::DecryptionFailed(secret_name.to_string()),
                _ => SecretError::AwsSdk(DisplayErrorContext(&service_error).to_string()),
            }
        }
        SdkError::TimeoutError(_) => SecretError::Timeout(secret_name.to_string()),
        other => SecretError::AwsSdk(DisplayErrorContext(&other).to_string()),
    };

    warn!(secret_name = %secret_name, error = %error, "Secret lookup failed");
    error
}
