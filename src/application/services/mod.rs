//! Business logic services for the application layer.

pub mod auth_service;
pub mod order_service;
pub mod restaurant_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use order_service::{CartLine, CheckoutRequest, CheckoutSettings, OrderService, OrderView};
pub use restaurant_service::{RestaurantService, SEARCH_PAGE_SIZE, SearchPage, SearchParams};
pub use user_service::{RegisterUser, Registration, UserService};
