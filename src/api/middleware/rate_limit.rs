//! Rate limiting middleware using token bucket algorithm.
//!
//! Each limiter exists in two flavours: keyed by the socket peer address, or
//! by the client address reported in `X-Forwarded-For` / `X-Real-IP` /
//! `Forwarded` for deployments behind a trusted reverse proxy.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

type Layer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn build<K>(key_extractor: K, per_second: u64, burst_size: u32) -> Layer<K>
where
    K: KeyExtractor,
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(per_second)
            .burst_size(burst_size)
            .finish()
            .expect("rate limit quota is non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Rate limiter for public endpoints (restaurant lookup and search).
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer() -> Layer<PeerIpKeyExtractor> {
    build(PeerIpKeyExtractor, 2, 100)
}

/// [`layer`] keyed by the forwarded client address.
pub fn proxied_layer() -> Layer<SmartIpKeyExtractor> {
    build(SmartIpKeyExtractor, 2, 100)
}

/// Stricter limiter for authenticated endpoints.
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 30 requests
pub fn secure_layer() -> Layer<PeerIpKeyExtractor> {
    build(PeerIpKeyExtractor, 1, 30)
}

/// [`secure_layer`] keyed by the forwarded client address.
pub fn proxied_secure_layer() -> Layer<SmartIpKeyExtractor> {
    build(SmartIpKeyExtractor, 1, 30)
}
