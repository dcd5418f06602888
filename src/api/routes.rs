//! API route configuration.
//!
//! Routes are grouped by the authentication they need; [`crate::routes`]
//! applies rate limiting per group and nests everything under `/api`.

use crate::api::extract::MAX_FORM_BYTES;
use crate::api::handlers::{
    create_checkout_session_handler, create_current_user_handler, create_my_restaurant_handler,
    get_current_user_handler, get_my_restaurant_handler, get_restaurant_handler,
    my_orders_handler, my_restaurant_orders_handler, search_restaurants_handler,
    stripe_webhook_handler, update_current_user_handler, update_my_restaurant_handler,
    update_order_status_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
};

/// Unauthenticated restaurant lookup and search.
///
/// # Endpoints
///
/// - `GET /restaurant/search/{city}` - Paginated city search
/// - `GET /restaurant/{restaurantId}` - Single restaurant
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/restaurant/search/{city}", get(search_restaurants_handler))
        .route("/restaurant/{restaurant_id}", get(get_restaurant_handler))
}

/// Payment processor callbacks, authenticated by signature instead of a
/// bearer token.
///
/// # Endpoints
///
/// - `POST /order/checkout/webhook`
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/order/checkout/webhook", post(stripe_webhook_handler))
}

/// Routes that require a bearer token.
///
/// `POST /my/user` only verifies the token, since it creates the local
/// account; every other route also requires that account to exist.
///
/// # Endpoints
///
/// - `GET    /my/user`                              - Caller's user record
/// - `POST   /my/user`                              - First-login registration
/// - `PUT    /my/user`                              - Replace profile fields
/// - `GET    /my/restaurant`                        - Caller's restaurant
/// - `POST   /my/restaurant`                        - Create restaurant (multipart)
/// - `PUT    /my/restaurant`                        - Update restaurant (multipart)
/// - `GET    /my/restaurant/order`                  - Orders placed at it
/// - `PATCH  /my/restaurant/order/{orderId}/status` - Advance an order
/// - `GET    /order`                                - Caller's orders
/// - `POST   /order/checkout/create-checkout-session` - Start checkout
pub fn protected_routes(state: AppState) -> Router<AppState> {
    let registration = Router::new()
        .route("/my/user", post(create_current_user_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::verify_token,
        ));

    let account = Router::new()
        .route(
            "/my/user",
            get(get_current_user_handler).put(update_current_user_handler),
        )
        .route(
            "/my/restaurant",
            get(get_my_restaurant_handler)
                .post(create_my_restaurant_handler)
                .put(update_my_restaurant_handler)
                .layer(DefaultBodyLimit::max(MAX_FORM_BYTES)),
        )
        .route("/my/restaurant/order", get(my_restaurant_orders_handler))
        .route(
            "/my/restaurant/order/{order_id}/status",
            patch(update_order_status_handler),
        )
        .route("/order", get(my_orders_handler))
        .route(
            "/order/checkout/create-checkout-session",
            post(create_checkout_session_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::resolve_user));

    registration.merge(account)
}
