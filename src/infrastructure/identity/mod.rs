//! Bearer token verification.
//!
//! The identity provider issues RS256-signed JWTs and publishes its signing
//! keys as a JWKS document. [`JwksVerifier`] checks signature, expiry, issuer
//! and audience, and yields the token subject.

mod jwks;

pub use jwks::JwksVerifier;

use async_trait::async_trait;

use crate::domain::entities::Subject;

/// Reasons a bearer token is rejected.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("token header has no key id")]
    MissingKeyId,

    #[error("no signing key with id '{0}'")]
    UnknownKey(String),

    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(#[from] reqwest::Error),

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Verifies bearer tokens and extracts the subject id.
///
/// Implementations must fail closed: any error means the request is
/// unauthenticated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Subject, IdentityError>;
}
