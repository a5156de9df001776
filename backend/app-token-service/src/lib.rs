pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
pub use models::{AccessToken, Assertion, InstallationId, SigningCredential};
pub use services::TokenIssuer;
