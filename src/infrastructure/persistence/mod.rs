//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Embedded
//! sub-documents (menus, carts, delivery details) are stored as `JSONB`.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - User storage keyed by identity subject
//! - [`PgRestaurantRepository`] - Restaurant storage and city search
//! - [`PgOrderRepository`] - Order storage and status updates

mod records;

pub mod pg_order_repository;
pub mod pg_restaurant_repository;
pub mod pg_user_repository;

pub use pg_order_repository::PgOrderRepository;
pub use pg_restaurant_repository::PgRestaurantRepository;
pub use pg_user_repository::PgUserRepository;
