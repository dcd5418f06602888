//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.
//! Handlers stay thin: extract, call one service method, shape the response.

pub mod health;
pub mod my_restaurant;
pub mod order;
pub mod restaurant;
pub mod user;

pub use health::health_handler;
pub use my_restaurant::{
    create_my_restaurant_handler, get_my_restaurant_handler, my_restaurant_orders_handler,
    update_my_restaurant_handler, update_order_status_handler,
};
pub use order::{create_checkout_session_handler, my_orders_handler, stripe_webhook_handler};
pub use restaurant::{get_restaurant_handler, search_restaurants_handler};
pub use user::{create_current_user_handler, get_current_user_handler, update_current_user_handler};
