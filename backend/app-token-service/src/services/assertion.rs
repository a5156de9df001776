use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Assertion, SigningCredential};

/// Lifetime of an app assertion. The provider rejects anything longer.
pub const ASSERTION_LIFETIME_SECS: i64 = 600;

/// Claims carried by an app assertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Builds RS256-signed app assertions
#[derive(Debug, Clone)]
pub struct AssertionSigner {
    issuer: String,
}

impl AssertionSigner {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Sign a fresh assertion valid for [`ASSERTION_LIFETIME_SECS`] from now
    pub fn sign(&self, credential: &SigningCredential) -> Result<Assertion> {
        self.sign_at(credential, Utc::now())
    }

    pub fn sign_at(&self, credential: &SigningCredential, now: DateTime<Utc>) -> Result<Assertion> {
        let key = EncodingKey::from_rsa_pem(credential.pem())
            .map_err(|e| AppError::InvalidKeyMaterial(e.to_string()))?;

        let claims = AssertionClaims {
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidKeyFormat | ErrorKind::InvalidRsaKey(_) => {
                    AppError::InvalidKeyMaterial(e.to_string())
                }
                _ => AppError::SigningError(e.to_string()),
            }
        })?;

        tracing::debug!(iss = %claims.iss, exp = claims.exp, "Signed app assertion");

        Ok(Assertion::new(token, claims.iat, claims.exp))
    }
}
