//! Configuration management for the App Token Service
//!
//! Loaded once at startup from environment variables (and a `.env` file when
//! present). The resulting [`Config`] is immutable and shared read-only by
//! every request.

use anyhow::{bail, Context, Result};
use reqwest::header::HeaderValue;
use std::env;
use std::fmt;
use std::time::Duration;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_GITHUB_API_VERSION: &str = "2022-11-28";
const DEFAULT_GITHUB_ACCEPT: &str = "application/vnd.github+json";
const DEFAULT_PEM_SECRET_VAR: &str = "PEM_SECRET";

/// Application settings
#[derive(Clone)]
pub struct Config {
    pub app: AppConfig,
    pub github_app: GitHubAppConfig,
    /// Shared secret callers present to `/generate-token`
    pub caller_token: String,
    pub secret_source: SecretSourceConfig,
    pub outbound_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

/// Identity of the app and the provider endpoint it exchanges against
#[derive(Debug, Clone)]
pub struct GitHubAppConfig {
    pub app_id: String,
    pub installation_id: String,
    pub api_url: String,
    pub api_version: HeaderValue,
    pub accept: HeaderValue,
}

/// Where the signing key is resolved from
#[derive(Clone)]
pub enum SecretSourceConfig {
    /// Read the PEM from the named environment variable on every request
    Environment { var: String },
    /// Fetch the PEM from AWS Secrets Manager on every request
    Aws {
        region: String,
        access_key_id: String,
        secret_access_key: String,
        secret_name: String,
        endpoint_url: Option<String>,
    },
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        if dotenvy::dotenv().is_ok() {
            tracing::info!("Loaded .env file");
        }

        let caller_token = required("CALLER_TOKEN")?;

        Ok(Self {
            app: AppConfig {
                host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("APP_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("Invalid APP_PORT")?,
            },
            github_app: GitHubAppConfig {
                app_id: required("APP_ID")?,
                installation_id: required("APP_INSTALLATION_ID")?,
                api_url: env::var("GITHUB_API_URL")
                    .unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_string()),
                api_version: header_value("GITHUB_API_VERSION", DEFAULT_GITHUB_API_VERSION)?,
                accept: header_value("GITHUB_ACCEPT", DEFAULT_GITHUB_ACCEPT)?,
            },
            caller_token,
            secret_source: SecretSourceConfig::from_env()?,
            outbound_timeout: Duration::from_secs(
                env::var("OUTBOUND_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("Invalid OUTBOUND_TIMEOUT_SECS")?,
            ),
        })
    }
}

impl SecretSourceConfig {
    fn from_env() -> Result<Self> {
        let source = env::var("SECRET_SOURCE").unwrap_or_else(|_| "env".to_string());

        match source.trim().to_ascii_lowercase().as_str() {
            "env" | "environment" => Ok(Self::Environment {
                var: env::var("PEM_SECRET_VAR")
                    .unwrap_or_else(|_| DEFAULT_PEM_SECRET_VAR.to_string()),
            }),
            "aws" | "aws-secrets-manager" => Ok(Self::Aws {
                region: required("AWS_REGION")?,
                access_key_id: required("AWS_ACCESS_KEY_ID")?,
                secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
                secret_name: required("SECRET_NAME")?,
                endpoint_url: env::var("AWS_ENDPOINT_URL").ok().filter(|v| !v.is_empty()),
            }),
            other => bail!("Invalid SECRET_SOURCE '{}': expected 'env' or 'aws'", other),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Environment { .. } => "env",
            Self::Aws { .. } => "aws",
        }
    }
}

fn required(name: &str) -> Result<String> {
    let value = env::var(name).with_context(|| format!("{} must be set", name))?;
    if value.trim().is_empty() {
        bail!("{} must not be empty", name);
    }
    Ok(value)
}

/// Read an outbound header value, rejecting bytes HTTP cannot carry
fn header_value(name: &str, default: &str) -> Result<HeaderValue> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    HeaderValue::from_str(&value).with_context(|| format!("Invalid {}", name))
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app", &self.app)
            .field("github_app", &self.github_app)
            .field("caller_token", &"[REDACTED]")
            .field("secret_source", &self.secret_source)
            .field("outbound_timeout", &self.outbound_timeout)
            .finish()
    }
}

impl fmt::Debug for SecretSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment { var } => f.debug_struct("Environment").field("var", var).finish(),
            Self::Aws {
                region,
                access_key_id,
                secret_name,
                endpoint_url,
                ..
            } => f
                .debug_struct("Aws")
                .field("region", region)
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"[REDACTED]")
                .field("secret_name", secret_name)
                .field("endpoint_url", endpoint_url)
                .finish(),
        }
    }
}
