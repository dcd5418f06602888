//! User entity keyed by the identity provider subject.

use uuid::Uuid;

/// A registered user.
///
/// `auth0_id` is the subject claim issued by the identity provider. It is set
/// once at creation and never changes; every other profile field is
/// self-service.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub auth0_id: String,
    pub email: String,
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Input data for creating a user on first login.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub auth0_id: String,
    pub email: String,
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Mutable profile fields, replaced wholesale on update.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub address_line1: String,
    pub city: String,
    pub country: String,
}

impl User {
    /// Applies a profile update in place.
    pub fn apply_profile(&mut self, profile: UserProfile) {
        self.name = Some(profile.name);
        self.address_line1 = Some(profile.address_line1);
        self.city = Some(profile.city);
        self.country = Some(profile.country);
    }
}
