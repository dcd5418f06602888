//! Handlers for the caller's orders, checkout and the payment webhook.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::api::dto::order::{CheckoutSessionResponse, CreateCheckoutSessionRequest, OrderResponse};
use crate::api::extract::ValidatedJson;
use crate::domain::entities::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the payment processor's webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Lists the caller's orders, oldest first.
///
/// # Endpoint
///
/// `GET /api/order`
pub async fn my_orders_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state.order_service.list_for_user(user.user_id).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// Prices the cart, opens a hosted checkout session and records the order.
///
/// # Endpoint
///
/// `POST /api/order/checkout/create-checkout-session`
///
/// # Request Body
///
/// ```json
/// {
///   "restaurantId": "...",
///   "cartItems": [ { "menuItemId": "...", "name": "Pizza", "quantity": "2" } ],
///   "deliveryDetails": {
///     "email": "ana@example.com", "name": "Ana", "addressLine1": "Calle 1", "city": "Santiago"
///   }
/// }
/// ```
///
/// # Response
///
/// ```json
/// { "url": "https://checkout.stripe.com/c/pay/..." }
/// ```
pub async fn create_checkout_session_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCheckoutSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>, AppError> {
    let url = state
        .order_service
        .create_checkout_session(user.user_id, payload.into_checkout())
        .await?;

    Ok(Json(CheckoutSessionResponse { url }))
}

/// Receives payment processor events.
///
/// # Endpoint
///
/// `POST /api/order/checkout/webhook`
///
/// Not behind bearer authentication: deliveries are authenticated by the
/// `Stripe-Signature` header over the raw body, which must therefore reach
/// this handler unparsed.
///
/// # Response Codes
///
/// - **200 OK**: Event applied or ignored
/// - **400 Bad Request**: Missing or invalid signature
/// - **404 Not Found**: A completed checkout names an unknown order
pub async fn stripe_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    state.order_service.handle_webhook(&body, signature).await?;

    Ok(StatusCode::OK)
}
