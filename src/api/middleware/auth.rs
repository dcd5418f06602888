//! Bearer token authentication middleware.
//!
//! Two stages share the same token handling:
//!
//! - [`verify_token`] proves the caller holds a valid token and inserts the
//!   [`Subject`] into request extensions. Used where the local account may
//!   not exist yet (first-login registration).
//! - [`resolve_user`] additionally requires a local account and inserts the
//!   [`CurrentUser`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::domain::entities::{CurrentUser, Subject};
use crate::{error::AppError, state::AppState};

async fn bearer_token(parts: &mut Parts) -> Result<String, AppError> {
    let AuthBearer(token) = AuthBearer::from_request_parts(parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;
    Ok(token)
}

/// Verifies the bearer token and exposes its [`Subject`] to the handler.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing or malformed, or the
/// token fails verification (signature, expiry, issuer, audience).
pub async fn verify_token(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let token = bearer_token(&mut parts).await?;

    let subject: Subject = st.auth_service.authenticate(&token).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(subject);

    Ok(next.run(req).await)
}

/// Verifies the bearer token and resolves it to a local user.
///
/// # Errors
///
/// Returns `401 Unauthorized` for everything [`verify_token`] rejects, and
/// when no local account exists for the token's subject.
///
/// # Example
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/order", get(my_orders_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::resolve_user));
/// ```
pub async fn resolve_user(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let token = bearer_token(&mut parts).await?;

    let user: CurrentUser = st.auth_service.resolve_user(&token).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
