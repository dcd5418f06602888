//! JWKS-backed RS256 token verifier.

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

use super::{IdentityError, TokenVerifier};
use crate::domain::entities::Subject;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Shortest time between two fetches of the key set.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Verifies tokens issued by an OIDC issuer.
///
/// Signing keys are fetched from `{issuer}/.well-known/jwks.json` on first
/// use and fetched again when a token names a key id that is not in the
/// current set, which covers provider key rotation. Fetches are at least
/// 30 seconds apart; an unknown key id inside that window is rejected
/// without a fetch.
pub struct JwksVerifier {
    client: reqwest::Client,
    jwks_url: String,
    validation: Validation,
    keys: RwLock<Option<JwkSet>>,
    last_refresh: Mutex<Option<Instant>>,
    min_refresh_interval: Duration,
}

impl JwksVerifier {
    /// Creates a verifier for `issuer_base_url` accepting tokens for `audience`.
    ///
    /// The issuer is accepted with or without a trailing slash, since
    /// providers differ in how they write the `iss` claim.
    pub fn new(
        issuer_base_url: &str,
        audience: &str,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let issuer = issuer_base_url.trim_end_matches('/');

        Ok(Self::with_client(
            client,
            format!("{issuer}/.well-known/jwks.json"),
            issuer,
            audience,
            None,
        ))
    }

    fn with_client(
        client: reqwest::Client,
        jwks_url: String,
        issuer: &str,
        audience: &str,
        keys: Option<JwkSet>,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer.to_string(), format!("{issuer}/")]);
        validation.set_audience(&[audience]);

        Self {
            client,
            jwks_url,
            validation,
            keys: RwLock::new(keys),
            last_refresh: Mutex::new(None),
            min_refresh_interval: MIN_REFRESH_INTERVAL,
        }
    }

    async fn cached_key(&self, kid: &str) -> Result<Option<DecodingKey>, IdentityError> {
        let keys = self.keys.read().await;
        match keys.as_ref().and_then(|set| set.find(kid)) {
            Some(jwk) => Ok(Some(DecodingKey::from_jwk(jwk)?)),
            None => Ok(None),
        }
    }

    async fn refresh_keys(&self) -> Result<(), IdentityError> {
        let set: JwkSet = self
            .client
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::info!(keys = set.keys.len(), url = %self.jwks_url, "Fetched signing keys");
        *self.keys.write().await = Some(set);
        Ok(())
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        if let Some(key) = self.cached_key(kid).await? {
            return Ok(key);
        }

        let unknown = || IdentityError::UnknownKey(kid.to_string());

        // Held across the fetch so concurrent misses share one request.
        let mut last_refresh = self.last_refresh.lock().await;
        if let Some(key) = self.cached_key(kid).await? {
            return Ok(key);
        }
        if last_refresh.is_some_and(|at| at.elapsed() < self.min_refresh_interval) {
            tracing::debug!(kid, "Unknown key id within refresh interval");
            return Err(unknown());
        }

        *last_refresh = Some(Instant::now());
        self.refresh_keys().await?;
        drop(last_refresh);

        self.cached_key(kid).await?.ok_or_else(unknown)
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<Subject, IdentityError> {
        let header = jsonwebtoken::decode_header(token)?;
        let kid = header.kid.ok_or(IdentityError::MissingKeyId)?;
        let key = self.decoding_key(&kid).await?;

        let data = jsonwebtoken::decode::<Claims>(token, &key, &self.validation)?;

        Ok(Subject(data.claims.sub))
    }
}
