//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures with the few state transitions that
//! belong to them; persistence and wire formats live in other layers.
//!
//! # Entity Types
//!
//! - [`User`] - A registered customer or restaurant operator
//! - [`Restaurant`] - A restaurant with its embedded [`MenuItem`]s
//! - [`Order`] - A checkout with its [`CartItem`] snapshot and [`OrderStatus`]
//!
//! # Design Pattern
//!
//! Creation and update inputs are separate structs:
//! - `NewUser`, `UserProfile` - User creation and profile replacement
//! - `RestaurantDraft`, `MenuItemDraft` - Validated owner input

pub mod identity;
pub mod order;
pub mod restaurant;
pub mod user;

pub use identity::{CurrentUser, Subject};
pub use order::{CartItem, DeliveryDetails, Order, OrderStatus, UnknownStatus};
pub use restaurant::{MenuItem, MenuItemDraft, Restaurant, RestaurantDraft};
pub use user::{NewUser, User, UserProfile};
