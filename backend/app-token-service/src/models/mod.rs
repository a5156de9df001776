use serde::Serialize;
use std::fmt;
use zeroize::Zeroizing;

/// PEM-encoded private key plus the issuer it signs for
///
/// The PEM buffer is zeroed on drop and never printed.
pub struct SigningCredential {
    pem: Zeroizing<String>,
}

impl SigningCredential {
    pub fn from_pem(pem: impl Into<String>) -> Self {
        Self {
            pem: Zeroizing::new(pem.into()),
        }
    }

    pub fn pem(&self) -> &[u8] {
        self.pem.as_bytes()
    }
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningCredential([REDACTED])")
    }
}

/// Signed, time-boxed app assertion in compact JWS form
///
/// Not `Clone`: handing it to the token exchanger consumes it.
pub struct Assertion {
    token: String,
    issued_at: i64,
    expires_at: i64,
}

impl Assertion {
    pub(crate) fn new(token: String, issued_at: i64, expires_at: i64) -> Self {
        Self {
            token,
            issued_at,
            expires_at,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Installation-scoped bearer token issued by the provider
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Installation the exchanged token is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationId(String);

impl InstallationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateTokenResponse {
    pub access_token: AccessToken,
}
