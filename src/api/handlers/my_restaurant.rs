//! Handlers for the caller's own restaurant and its incoming orders.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::order::{OrderResponse, UpdateOrderStatusRequest};
use crate::api::dto::restaurant::RestaurantResponse;
use crate::api::extract::{RestaurantMultipart, ValidatedJson, path_id};
use crate::domain::entities::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the caller's restaurant.
///
/// # Endpoint
///
/// `GET /api/my/restaurant`
pub async fn get_my_restaurant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<RestaurantResponse>, AppError> {
    let restaurant = state.restaurant_service.get_owned(user.user_id).await?;
    Ok(Json(restaurant.into()))
}

/// Creates the caller's restaurant from a multipart form.
///
/// # Endpoint
///
/// `POST /api/my/restaurant`
///
/// The form must include an `imageFile`; see [`RestaurantMultipart`] for
/// the field layout.
///
/// # Response Codes
///
/// - **201 Created**: Restaurant in the body
/// - **400 Bad Request**: Invalid fields or missing image
/// - **409 Conflict**: The caller already owns a restaurant
pub async fn create_my_restaurant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    RestaurantMultipart(form): RestaurantMultipart,
) -> Result<(StatusCode, Json<RestaurantResponse>), AppError> {
    let (draft, image) = form.into_draft();
    let restaurant = state
        .restaurant_service
        .create_owned(user.user_id, draft, image)
        .await?;

    Ok((StatusCode::CREATED, Json(restaurant.into())))
}

/// Replaces the caller's restaurant fields.
///
/// # Endpoint
///
/// `PUT /api/my/restaurant`
///
/// The image is optional here; without one the current image is kept.
pub async fn update_my_restaurant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    RestaurantMultipart(form): RestaurantMultipart,
) -> Result<Json<RestaurantResponse>, AppError> {
    let (draft, image) = form.into_draft();
    let restaurant = state
        .restaurant_service
        .update_owned(user.user_id, draft, image)
        .await?;

    Ok(Json(restaurant.into()))
}

/// Lists every order placed at the caller's restaurant.
///
/// # Endpoint
///
/// `GET /api/my/restaurant/order`
///
/// Each order has its `restaurant` and `user` inlined.
pub async fn my_restaurant_orders_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state
        .restaurant_service
        .list_owned_orders(user.user_id)
        .await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// Moves an order of the caller's restaurant along the fulfilment flow.
///
/// # Endpoint
///
/// `PATCH /api/my/restaurant/order/{orderId}/status`
///
/// # Request Body
///
/// ```json
/// { "status": "outForDelivery" }
/// ```
///
/// # Response Codes
///
/// - **200 OK**: Updated order
/// - **400 Bad Request**: Unknown status, a status reserved for checkout and
///   payment, or a backwards move
/// - **401 Unauthorized**: The caller does not own the order's restaurant
/// - **404 Not Found**: No such order
pub async fn update_order_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order_id = path_id(&order_id, "Order")?;
    let status = payload
        .status()
        .ok_or_else(|| AppError::invalid_field("status", "Unknown status"))?;

    let order = state
        .restaurant_service
        .update_order_status(user.user_id, order_id, status)
        .await?;

    Ok(Json(order.into()))
}
