pub mod assertion;
pub mod issuer;
pub mod secret_provider;
pub mod token_exchange;

pub use assertion::{AssertionClaims, AssertionSigner, ASSERTION_LIFETIME_SECS};
pub use issuer::TokenIssuer;
pub use secret_provider::{
    build_key_provider, EnvironmentKeySource, SigningKeyProvider, VaultKeySource,
};
pub use token_exchange::{parse_token, TokenExchanger};
