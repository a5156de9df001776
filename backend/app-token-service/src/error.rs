use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures of the issuance pipeline and the HTTP boundary
///
/// The `String` payloads carry diagnostic detail for logs. They never reach the
/// caller: [`ResponseError`] only exposes [`AppError::category`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Signing key unavailable: {0}")]
    SecretUnavailable(String),

    #[error("Invalid signing key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Failed to sign assertion: {0}")]
    SigningError(String),

    #[error("Token endpoint request failed: {0}")]
    NetworkError(String),

    #[error("Token endpoint returned status {status}")]
    UpstreamError { status: u16 },

    #[error("Malformed token endpoint response: {0}")]
    MalformedResponse(String),

    #[error("Authentication failed")]
    AuthRejected,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl AppError {
    /// Caller-safe description of the failure
    pub fn category(&self) -> &'static str {
        match self {
            AppError::SecretUnavailable(_) => "Secret retrieval failed",
            AppError::InvalidKeyMaterial(_) | AppError::SigningError(_) => {
                "Failed to generate JWT token"
            }
            AppError::NetworkError(_)
            | AppError::UpstreamError { .. }
            | AppError::MalformedResponse(_) => "Failed to generate app access token",
            AppError::AuthRejected => "Authentication failed",
            AppError::MethodNotAllowed => "Method not allowed",
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        let mut builder = HttpResponse::build(code);

        if let AppError::MethodNotAllowed = self {
            builder.insert_header((header::ALLOW, "POST"));
        }

        builder.json(ErrorResponse {
            error: self.category().to_string(),
            code: code.as_u16(),
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthRejected => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<aws_secrets::SecretError> for AppError {
    fn from(err: aws_secrets::SecretError) -> Self {
        AppError::SecretUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // URL embeds the installation path
        AppError::NetworkError(err.without_url().to_string())
    }
}
