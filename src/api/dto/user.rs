//! DTOs for the current-user endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::application::services::RegisterUser;
use crate::domain::entities::{User, UserProfile};

/// Request body for `POST /api/my/user`.
///
/// The subject is always taken from the verified token; `auth0Id` is accepted
/// for compatibility but must match it.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub auth0_id: Option<String>,

    #[validate(
        required(message = "Email is required"),
        email(message = "Email must be a valid address")
    )]
    pub email: Option<String>,

    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl CreateUserRequest {
    /// Converts a validated request. Call only after `validate()` succeeded.
    pub fn into_registration(self) -> RegisterUser {
        RegisterUser {
            email: self.email.unwrap_or_default(),
            name: self.name,
            address_line1: self.address_line1,
            city: self.city,
            country: self.country,
        }
    }
}

/// Request body for `PUT /api/my/user`. Every field is replaced.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, message = "Name must not be empty")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Address line 1 is required"),
        length(min = 1, message = "Address line 1 must not be empty")
    )]
    pub address_line1: Option<String>,

    #[validate(
        required(message = "City is required"),
        length(min = 1, message = "City must not be empty")
    )]
    pub city: Option<String>,

    #[validate(
        required(message = "Country is required"),
        length(min = 1, message = "Country must not be empty")
    )]
    pub country: Option<String>,
}

impl UpdateUserRequest {
    /// Converts a validated request. Call only after `validate()` succeeded.
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            name: self.name.unwrap_or_default(),
            address_line1: self.address_line1.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
        }
    }
}

/// User as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub auth0_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            auth0_id: u.auth0_id,
            email: u.email,
            name: u.name,
            address_line1: u.address_line1,
            city: u.city,
            country: u.country,
        }
    }
}
