//! Authenticated caller identities carried through request extensions.

use uuid::Uuid;

/// Subject claim of a verified bearer token.
///
/// Proves the caller holds a valid token; says nothing about whether a local
/// account exists yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(pub String);

/// A verified caller resolved to a local user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub subject: String,
}
