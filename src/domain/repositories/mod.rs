//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the document store. Implementations live in
//! `crate::infrastructure::persistence`; mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`UserRepository`] - User lookup and self-service profile changes
//! - [`RestaurantRepository`] - Restaurant CRUD and city search
//! - [`OrderRepository`] - Order persistence and status changes
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod order_repository;
pub mod restaurant_repository;
pub mod user_repository;

pub use order_repository::OrderRepository;
pub use restaurant_repository::{RestaurantRepository, RestaurantSearch, SortOption};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use order_repository::MockOrderRepository;
#[cfg(test)]
pub use restaurant_repository::MockRestaurantRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
