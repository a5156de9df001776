#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use app_token_service::config::GitHubAppConfig;
use app_token_service::services::{
    AssertionSigner, SigningKeyProvider, TokenExchanger, TokenIssuer,
};
use app_token_service::{AppError, InstallationId, Result, SigningCredential};

pub const PRIVATE_KEY: &str = include_str!("../fixtures/app-private-key.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/app-public-key.pem");

pub const APP_ID: &str = "app-1";
pub const INSTALLATION_ID: &str = "inst-42";
pub const TOKEN_PATH: &str = "/app/installations/inst-42/access_tokens";

/// Key provider returning a fixed PEM and counting lookups
#[derive(Default)]
pub struct StaticKeys {
    pem: Option<String>,
    pub calls: AtomicUsize,
}

impl StaticKeys {
    pub fn with_pem(pem: &str) -> Arc<Self> {
        Arc::new(Self {
            pem: Some(pem.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SigningKeyProvider for StaticKeys {
    async fn resolve_signing_key(&self) -> Result<SigningCredential> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pem
            .as_deref()
            .map(SigningCredential::from_pem)
            .ok_or_else(|| AppError::SecretUnavailable("no key configured".into()))
    }
}

pub fn github_config(api_url: &str) -> GitHubAppConfig {
    GitHubAppConfig {
        app_id: APP_ID.into(),
        installation_id: INSTALLATION_ID.into(),
        api_url: api_url.into(),
        api_version: HeaderValue::from_static("2022-11-28"),
        accept: HeaderValue::from_static("application/vnd.github+json"),
    }
}

pub fn exchanger(api_url: &str) -> TokenExchanger {
    TokenExchanger::new(&github_config(api_url), Duration::from_secs(5))
        .expect("exchanger should build")
}

pub fn issuer(api_url: &str, keys: Arc<dyn SigningKeyProvider>) -> TokenIssuer {
    TokenIssuer::new(
        keys,
        AssertionSigner::new(APP_ID),
        exchanger(api_url),
        InstallationId::new(INSTALLATION_ID),
    )
}
