//! HTTP boundary for the App Token Service
//!
//! Authenticates callers against the shared caller token and hands off to the
//! [`TokenIssuer`]. Failures are rendered by [`AppError`]'s `ResponseError` impl.

use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::{AppError, Result};
use crate::models::GenerateTokenResponse;
use crate::services::TokenIssuer;

/// Header carrying the caller's shared token
pub const CALLER_TOKEN_HEADER: &str = "x-initial-token";

/// Shared secret callers must present
#[derive(Clone)]
pub struct CallerToken(String);

impl CallerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn matches(&self, presented: &str) -> bool {
        !self.0.is_empty() && constant_time_compare(self.0.as_bytes(), presented.as_bytes())
    }
}

/// Mint an installation access token
pub async fn generate_token(
    req: HttpRequest,
    caller_token: web::Data<CallerToken>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse> {
    let presented = req
        .headers()
        .get(CALLER_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !caller_token.matches(presented) {
        tracing::warn!(
            peer = ?req.peer_addr(),
            token_present = !presented.is_empty(),
            "Rejected token request: caller authentication failed"
        );
        return Err(AppError::AuthRejected);
    }

    let access_token = issuer.issue().await?;

    Ok(HttpResponse::Ok().json(GenerateTokenResponse { access_token }))
}

pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse> {
    tracing::debug!(method = %req.method(), path = %req.path(), "Method not allowed");
    Err(AppError::MethodNotAllowed)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// Configure routes for the token service
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/generate-token")
            .route(web::post().to(generate_token))
            .default_service(web::to(method_not_allowed)),
    )
    .route("/health", web::get().to(health));
}

/// Compare in time independent of where the inputs differ
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
