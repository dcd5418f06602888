//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. Responses keep the web client's field names: `_id`
//! for identifiers and camelCase everywhere else.

pub mod health;
pub mod order;
pub mod restaurant;
pub mod search;
pub mod user;
