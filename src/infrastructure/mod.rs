//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer and wraps the
//! third-party services the API depends on.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`identity`] - Bearer token verification against the identity provider's JWKS
//! - [`assets`] - Image upload to the asset host
//! - [`payments`] - Checkout sessions and webhook verification for the payment processor

pub mod assets;
pub mod identity;
pub mod payments;
pub mod persistence;
