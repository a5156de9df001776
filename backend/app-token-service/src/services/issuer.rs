use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::Result;
use crate::models::{AccessToken, InstallationId};
use crate::services::assertion::AssertionSigner;
use crate::services::secret_provider::{build_key_provider, SigningKeyProvider};
use crate::services::token_exchange::TokenExchanger;

/// Issues installation access tokens: resolve key, sign assertion, exchange
///
/// Holds only immutable collaborators; every [`TokenIssuer::issue`] call runs
/// the whole pipeline from scratch.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<dyn SigningKeyProvider>,
    signer: AssertionSigner,
    exchanger: TokenExchanger,
    installation: InstallationId,
}

impl TokenIssuer {
    pub fn new(
        keys: Arc<dyn SigningKeyProvider>,
        signer: AssertionSigner,
        exchanger: TokenExchanger,
        installation: InstallationId,
    ) -> Self {
        Self {
            keys,
            signer,
            exchanger,
            installation,
        }
    }

    /// Wire the pipeline from startup configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let keys = build_key_provider(&config.secret_source, config.outbound_timeout).await;
        let exchanger = TokenExchanger::new(&config.github_app, config.outbound_timeout)?;

        Ok(Self::new(
            keys,
            AssertionSigner::new(config.github_app.app_id.clone()),
            exchanger,
            InstallationId::new(config.github_app.installation_id.clone()),
        ))
    }

    pub async fn issue(&self) -> Result<AccessToken> {
        let started = Instant::now();

        let credential = self.keys.resolve_signing_key().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to resolve signing key");
            e
        })?;

        let assertion = self.signer.sign(&credential).map_err(|e| {
            tracing::error!(error = %e, iss = %self.signer.issuer(), "Failed to sign app assertion");
            e
        })?;
        drop(credential);

        let token = self
            .exchanger
            .exchange(assertion, &self.installation)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    installation_id = %self.installation,
                    "Failed to exchange app assertion"
                );
                e
            })?;

        tracing::debug!(
            installation_id = %self.installation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Token issuance completed"
        );

        Ok(token)
    }
}
