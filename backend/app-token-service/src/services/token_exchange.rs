use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::GitHubAppConfig;
use crate::error::{AppError, Result};
use crate::models::{AccessToken, Assertion, InstallationId};

const API_VERSION_HEADER: &str = "x-github-api-version";

/// Exchanges app assertions for installation access tokens
#[derive(Clone)]
pub struct TokenExchanger {
    http: Client,
    api_url: String,
}

impl TokenExchanger {
    /// Build an exchanger whose every request is bounded by `timeout`
    pub fn new(config: &GitHubAppConfig, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, config.accept.clone());
        headers.insert(API_VERSION_HEADER, config.api_version.clone());

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, installation: &InstallationId) -> String {
        format!(
            "{}/app/installations/{}/access_tokens",
            self.api_url, installation
        )
    }

    /// Present the assertion once; no retries
    pub async fn exchange(
        &self,
        assertion: Assertion,
        installation: &InstallationId,
    ) -> Result<AccessToken> {
        let response = self
            .http
            .post(self.endpoint(installation))
            .bearer_auth(assertion.as_str())
            .send()
            .await?;
        drop(assertion);

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string));
            tracing::warn!(
                installation_id = %installation,
                status = status.as_u16(),
                message = message.as_deref().unwrap_or(""),
                "Token endpoint rejected the assertion"
            );
            return Err(AppError::UpstreamError {
                status: status.as_u16(),
            });
        }

        let token = parse_token(&body)?;

        tracing::info!(
            installation_id = %installation,
            status = status.as_u16(),
            "Installation access token issued"
        );

        Ok(token)
    }
}

/// Extract the `token` string from a token endpoint response body
pub fn parse_token(body: &[u8]) -> Result<AccessToken> {
    let data: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::MalformedResponse(format!("body is not JSON: {}", e)))?;

    let object = data
        .as_object()
        .ok_or_else(|| AppError::MalformedResponse("body is not a JSON object".into()))?;

    match object.get("token") {
        Some(Value::String(token)) => Ok(AccessToken::new(token.clone())),
        Some(_) => Err(AppError::MalformedResponse("token is not a string".into())),
        None => Err(AppError::MalformedResponse("token not found in response".into())),
    }
}
