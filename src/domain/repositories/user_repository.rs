//! Repository trait for users.

use crate::domain::entities::{NewUser, User, UserProfile};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for user records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Round-trips to the store. Used by health checks.
    async fn ping(&self) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Finds a user by identity provider subject.
    async fn find_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>, AppError>;

    /// Fetches every user whose id is in `ids`. Missing ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError>;

    /// Inserts a user unless one already exists for the same subject.
    ///
    /// Returns `Ok(None)` when the subject is already registered, including
    /// when a concurrent request won the insert.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_user: NewUser) -> Result<Option<User>, AppError>;

    /// Replaces the mutable profile fields.
    ///
    /// Returns `Ok(None)` if the user does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        profile: UserProfile,
    ) -> Result<Option<User>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}
