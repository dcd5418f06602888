//! Handlers for the caller's own user record.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::user::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::api::extract::ValidatedJson;
use crate::application::services::Registration;
use crate::domain::entities::{CurrentUser, Subject};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the caller's user record.
///
/// # Endpoint
///
/// `GET /api/my/user`
///
/// # Errors
///
/// Returns 404 if the record no longer exists.
pub async fn get_current_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.user_service.get_current(user.user_id).await?;
    Ok(Json(user.into()))
}

/// Registers the caller on first login.
///
/// # Endpoint
///
/// `POST /api/my/user`
///
/// Only the bearer token is required; the local account is what this call
/// creates. The subject id always comes from the token. An `auth0Id` in the
/// body is accepted for client compatibility but must match it.
///
/// # Request Body
///
/// ```json
/// { "auth0Id": "auth0|abc", "email": "ana@example.com" }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: New user, record in the body
/// - **200 OK**: The subject was already registered; empty body
pub async fn create_current_user_handler(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<Response, AppError> {
    if let Some(claimed) = payload.auth0_id.as_deref()
        && claimed != subject.0
    {
        return Err(AppError::invalid_field(
            "auth0Id",
            "auth0Id does not match the authenticated subject",
        ));
    }

    match state
        .user_service
        .register(&subject, payload.into_registration())
        .await?
    {
        Registration::Created(user) => {
            Ok((StatusCode::CREATED, Json(UserResponse::from(user))).into_response())
        }
        Registration::AlreadyExists => Ok(StatusCode::OK.into_response()),
    }
}

/// Replaces the caller's profile fields.
///
/// # Endpoint
///
/// `PUT /api/my/user`
///
/// # Request Body
///
/// ```json
/// { "name": "Ana", "addressLine1": "Calle 1", "city": "Santiago", "country": "Chile" }
/// ```
pub async fn update_current_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let updated = state
        .user_service
        .update_current(user.user_id, payload.into_profile())
        .await?;

    Ok(Json(updated.into()))
}
