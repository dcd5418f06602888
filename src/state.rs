//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{
    AuthService, CheckoutSettings, OrderService, RestaurantService, UserService,
};
use crate::domain::repositories::{OrderRepository, RestaurantRepository, UserRepository};
use crate::infrastructure::assets::AssetUploader;
use crate::infrastructure::identity::TokenVerifier;
use crate::infrastructure::payments::PaymentGateway;
use crate::infrastructure::persistence::{
    PgOrderRepository, PgRestaurantRepository, PgUserRepository,
};

/// The three collections the services read and write.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub restaurants: Arc<dyn RestaurantRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool.
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            restaurants: Arc::new(PgRestaurantRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool)),
        }
    }
}

/// Clients for the external services.
#[derive(Clone)]
pub struct Gateways {
    pub identity: Arc<dyn TokenVerifier>,
    pub assets: Arc<dyn AssetUploader>,
    pub payments: Arc<dyn PaymentGateway>,
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub restaurant_service: Arc<RestaurantService>,
    pub order_service: Arc<OrderService>,
}

impl AppState {
    /// Wires the services together.
    pub fn new(repos: Repositories, gateways: Gateways, checkout: CheckoutSettings) -> Self {
        let auth_service = Arc::new(AuthService::new(gateways.identity, repos.users.clone()));
        let user_service = Arc::new(UserService::new(repos.users.clone()));
        let restaurant_service = Arc::new(RestaurantService::new(
            repos.restaurants.clone(),
            repos.orders.clone(),
            repos.users.clone(),
            gateways.assets,
        ));
        let order_service = Arc::new(OrderService::new(
            repos.orders,
            repos.restaurants,
            repos.users,
            gateways.payments,
            checkout,
        ));

        Self {
            auth_service,
            user_service,
            restaurant_service,
            order_service,
        }
    }
}
