//! Self-service user profile operations.

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewUser, Subject, User, UserProfile};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

/// Payload for registering the caller. The subject comes from the token.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub email: String,
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Result of a first-login registration.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Created(User),
    AlreadyExists,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Round-trips to the user store. Used by the health check.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.users.ping().await
    }

    /// Loads the caller's record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the record has disappeared since
    /// authentication.
    pub async fn get_current(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({})))
    }

    /// Registers the caller on first login. Idempotent per subject.
    pub async fn register(
        &self,
        subject: &Subject,
        input: RegisterUser,
    ) -> Result<Registration, AppError> {
        if self.users.find_by_auth0_id(&subject.0).await?.is_some() {
            return Ok(Registration::AlreadyExists);
        }

        let new_user = NewUser {
            auth0_id: subject.0.clone(),
            email: input.email,
            name: input.name,
            address_line1: input.address_line1,
            city: input.city,
            country: input.country,
        };

        match self.users.create(new_user).await? {
            Some(user) => {
                tracing::info!(user_id = %user.id, "User registered");
                Ok(Registration::Created(user))
            }
            None => Ok(Registration::AlreadyExists),
        }
    }

    /// Replaces the caller's profile fields.
    pub async fn update_current(
        &self,
        user_id: Uuid,
        profile: UserProfile,
    ) -> Result<User, AppError> {
        self.users
            .update_profile(user_id, profile)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({})))
    }
}
