//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! external gateways, and business rules. Services hold their collaborators as
//! trait objects and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::auth_service::AuthService`] - Bearer token verification and user resolution
//! - [`services::user_service::UserService`] - Registration and profile updates
//! - [`services::restaurant_service::RestaurantService`] - Restaurant ownership, search, order fulfilment
//! - [`services::order_service::OrderService`] - Checkout and payment webhooks

pub mod services;
