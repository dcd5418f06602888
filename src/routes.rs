//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`                 - Health check (public)
//! - `/api/restaurant/*`            - Restaurant lookup and search (public)
//! - `/api/order/checkout/webhook`  - Payment webhook (signature-authenticated)
//! - `/api/my/*`, `/api/order/*`    - Customer and operator API (Bearer token)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Any origin, for the browser client
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token verified against the identity provider
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let public = api::routes::public_routes();
    let protected = api::routes::protected_routes(state.clone());

    let (public, protected) = if behind_proxy {
        (
            public.layer(rate_limit::proxied_layer()),
            protected.layer(rate_limit::proxied_secure_layer()),
        )
    } else {
        (
            public.layer(rate_limit::layer()),
            protected.layer(rate_limit::secure_layer()),
        )
    };

    NormalizePathLayer::trim_trailing_slash().layer(compose(state, public, protected))
}

/// The same routes as [`app_router`] without rate limiting or path
/// normalization. Rate limiting keys on the peer address, which in-process
/// test clients do not have.
pub fn unthrottled_router(state: AppState) -> Router {
    compose(
        state.clone(),
        api::routes::public_routes(),
        api::routes::protected_routes(state),
    )
}

fn compose(
    state: AppState,
    public: Router<AppState>,
    protected: Router<AppState>,
) -> Router {
    let api_router = public
        .merge(protected)
        .merge(api::routes::webhook_routes());

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(tracing::layer())
}
