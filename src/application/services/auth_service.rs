//! Authentication service: bearer token → subject → local user.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{CurrentUser, Subject};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::infrastructure::identity::TokenVerifier;

/// Service for authenticating API requests via identity provider tokens.
///
/// Verification proves the caller holds a valid token. Resolution additionally
/// requires a local account for the token subject, which is created on the
/// caller's first `POST /api/my/user`.
pub struct AuthService {
    verifier: Arc<dyn TokenVerifier>,
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(verifier: Arc<dyn TokenVerifier>, users: Arc<dyn UserRepository>) -> Self {
        Self { verifier, users }
    }

    /// Verifies a raw bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for any verification failure,
    /// including failure to fetch the provider's signing keys.
    pub async fn authenticate(&self, token: &str) -> Result<Subject, AppError> {
        self.verifier.verify(token).await.map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AppError::unauthorized("Unauthorized", json!({"reason": "Invalid or expired token"}))
        })
    }

    /// Verifies a token and loads the matching local user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is invalid, no user is
    /// registered for its subject, or the lookup itself fails.
    pub async fn resolve_user(&self, token: &str) -> Result<CurrentUser, AppError> {
        let Subject(subject) = self.authenticate(token).await?;

        match self.users.find_by_auth0_id(&subject).await {
            Ok(Some(user)) => Ok(CurrentUser {
                user_id: user.id,
                subject,
            }),
            Ok(None) => {
                tracing::debug!(subject = %subject, "No local account for token subject");
                Err(AppError::unauthorized(
                    "Unauthorized",
                    json!({"reason": "No account for this identity"}),
                ))
            }
            Err(e) => {
                tracing::warn!(error = %e, "User lookup failed during authentication");
                Err(AppError::unauthorized("Unauthorized", json!({})))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::domain::repositories::MockUserRepository;
    use crate::infrastructure::identity::{IdentityError, MockTokenVerifier};
    use uuid::Uuid;

    fn verifier_accepting(subject: &'static str) -> MockTokenVerifier {
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .returning(move |_| Ok(Subject(subject.to_string())));
        verifier
    }

    fn user(id: Uuid, subject: &str) -> User {
        User {
            id,
            auth0_id: subject.to_string(),
            email: "a@example.com".to_string(),
            name: None,
            address_line1: None,
            city: None,
            country: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let service = AuthService::new(
            Arc::new(verifier_accepting("auth0|a")),
            Arc::new(MockUserRepository::new()),
        );

        let subject = service.authenticate("token").await.unwrap();

        assert_eq!(subject, Subject("auth0|a".to_string()));
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Err(IdentityError::MissingKeyId));

        let service = AuthService::new(Arc::new(verifier), Arc::new(MockUserRepository::new()));

        let result = service.authenticate("bad").await;

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_resolve_user_success() {
        let id = Uuid::new_v4();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_auth0_id()
            .withf(|subject| subject == "auth0|a")
            .times(1)
            .returning(move |s| Ok(Some(user(id, s))));

        let service = AuthService::new(Arc::new(verifier_accepting("auth0|a")), Arc::new(users));

        let current = service.resolve_user("token").await.unwrap();

        assert_eq!(current.user_id, id);
        assert_eq!(current.subject, "auth0|a");
    }

    #[tokio::test]
    async fn test_resolve_user_without_account() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_auth0_id().returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(verifier_accepting("auth0|a")), Arc::new(users));

        let result = service.resolve_user("token").await;

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_resolve_user_store_failure_is_unauthorized() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_auth0_id()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let service = AuthService::new(Arc::new(verifier_accepting("auth0|a")), Arc::new(users));

        let result = service.resolve_user("token").await;

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }
}
