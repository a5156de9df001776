//! Signing key resolution
//!
//! One strategy is chosen at startup from [`SecretSourceConfig`]; every request
//! then resolves the key again through it. Nothing is cached between requests.

use async_trait::async_trait;
use aws_secrets::{SecretManager, SecretStoreConfig};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SecretSourceConfig;
use crate::error::{AppError, Result};
use crate::models::SigningCredential;

#[async_trait]
pub trait SigningKeyProvider: Send + Sync {
    /// Resolve the PEM-encoded private key for the app
    async fn resolve_signing_key(&self) -> Result<SigningCredential>;
}

/// Reads the PEM from an environment variable on each call
#[derive(Debug, Clone)]
pub struct EnvironmentKeySource {
    var: String,
}

impl EnvironmentKeySource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl SigningKeyProvider for EnvironmentKeySource {
    async fn resolve_signing_key(&self) -> Result<SigningCredential> {
        match env::var(&self.var) {
            Ok(pem) if !pem.trim().is_empty() => Ok(SigningCredential::from_pem(pem)),
            Ok(_) => Err(AppError::SecretUnavailable(format!("{} is empty", self.var))),
            Err(_) => Err(AppError::SecretUnavailable(format!("{} is not set", self.var))),
        }
    }
}

/// Fetches the PEM from AWS Secrets Manager on each call
#[derive(Debug, Clone)]
pub struct VaultKeySource {
    manager: SecretManager,
    secret_name: String,
}

impl VaultKeySource {
    pub fn new(manager: SecretManager, secret_name: impl Into<String>) -> Self {
        Self {
            manager,
            secret_name: secret_name.into(),
        }
    }
}

#[async_trait]
impl SigningKeyProvider for VaultKeySource {
    async fn resolve_signing_key(&self) -> Result<SigningCredential> {
        let pem = self.manager.get_secret(&self.secret_name).await?;
        if pem.trim().is_empty() {
            return Err(AppError::SecretUnavailable(format!(
                "{} has an empty value",
                self.secret_name
            )));
        }
        Ok(SigningCredential::from_pem(pem))
    }
}

/// Build the configured key source
pub async fn build_key_provider(
    source: &SecretSourceConfig,
    timeout: Duration,
) -> Arc<dyn SigningKeyProvider> {
    match source {
        SecretSourceConfig::Environment { var } => {
            tracing::info!(var = %var, "Signing key source: environment");
            Arc::new(EnvironmentKeySource::new(var.clone()))
        }
        SecretSourceConfig::Aws {
            region,
            access_key_id,
            secret_access_key,
            secret_name,
            endpoint_url,
        } => {
            let mut store = SecretStoreConfig::new(
                region.clone(),
                access_key_id.clone(),
                secret_access_key.clone(),
            )
            .with_timeout(timeout);
            if let Some(url) = endpoint_url {
                store = store.with_endpoint_url(url.clone());
            }

            tracing::info!(secret_name = %secret_name, region = %region, "Signing key source: AWS Secrets Manager");
            let manager = SecretManager::with_static_credentials(&store).await;
            Arc::new(VaultKeySource::new(manager, secret_name.clone()))
        }
    }
}
