//! Checkout, payment confirmation and order listing.

use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{CartItem, DeliveryDetails, Order, OrderStatus, Restaurant, User};
use crate::domain::repositories::{OrderRepository, RestaurantRepository, UserRepository};
use crate::error::AppError;
use crate::infrastructure::payments::{
    CheckoutLineItem, CheckoutSessionRequest, PaymentEvent, PaymentGateway,
};

/// An order with its references resolved for display.
///
/// A reference is `None` when the referenced record no longer exists; the
/// bare id is still available on [`Order`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub order: Order,
    pub restaurant: Option<Restaurant>,
    pub user: Option<User>,
}

/// Resolves the restaurant and user of every order with one batch lookup each.
pub(crate) async fn expand_orders(
    orders: Vec<Order>,
    restaurants: &dyn RestaurantRepository,
    users: &dyn UserRepository,
) -> Result<Vec<OrderView>, AppError> {
    let mut restaurant_ids: Vec<Uuid> = orders.iter().map(|o| o.restaurant_id).collect();
    restaurant_ids.sort_unstable();
    restaurant_ids.dedup();
    let mut user_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let restaurants: HashMap<Uuid, Restaurant> = restaurants
        .find_by_ids(&restaurant_ids)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();
    let users: HashMap<Uuid, User> = users
        .find_by_ids(&user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(orders
        .into_iter()
        .map(|order| OrderView {
            restaurant: restaurants.get(&order.restaurant_id).cloned(),
            user: users.get(&order.user_id).cloned(),
            order,
        })
        .collect())
}

/// One requested cart line, ids as received from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub menu_item_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub restaurant_id: String,
    pub cart_items: Vec<CartLine>,
    pub delivery_details: DeliveryDetails,
}

/// Checkout settings taken from configuration.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Base URL of the web client, without a trailing slash.
    pub frontend_url: String,
    /// ISO currency code for prices, e.g. `clp`.
    pub currency: String,
}

impl CheckoutSettings {
    pub fn new(frontend_url: &str, currency: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            currency: currency.into(),
        }
    }
}

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
    users: Arc<dyn UserRepository>,
    payments: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
        users: Arc<dyn UserRepository>,
        payments: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            orders,
            restaurants,
            users,
            payments,
            settings,
        }
    }

    /// Orders placed by `user_id`, oldest first, with references expanded.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, AppError> {
        let orders = self.orders.list_by_user(user_id).await?;
        expand_orders(orders, self.restaurants.as_ref(), self.users.as_ref()).await
    }

    /// Prices the cart against the restaurant's current menu, opens a hosted
    /// checkout session and records the order.
    ///
    /// The order is persisted only after the session exists, so a failed
    /// session leaves nothing behind. The converse gap remains: if the insert
    /// fails after the session was created, the session's webhook will find
    /// no order.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the restaurant does not exist
    /// - [`AppError::Validation`] naming the first cart item that is not on
    ///   the menu; nothing is persisted and no session is opened
    /// - [`AppError::Internal`] if the payment processor fails or returns no URL
    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        request: CheckoutRequest,
    ) -> Result<String, AppError> {
        let restaurant = self.find_restaurant(&request.restaurant_id).await?;

        let mut cart_items = Vec::with_capacity(request.cart_items.len());
        let mut line_items = Vec::with_capacity(request.cart_items.len());
        for (i, line) in request.cart_items.iter().enumerate() {
            let menu_item = Uuid::parse_str(&line.menu_item_id)
                .ok()
                .and_then(|id| restaurant.menu_item(id))
                .ok_or_else(|| {
                    AppError::invalid_field(
                        &format!("cartItems[{i}].menuItemId"),
                        format!("Menu item not found: {}", line.menu_item_id),
                    )
                })?;

            cart_items.push(CartItem {
                menu_item_id: menu_item.id,
                quantity: line.quantity,
                name: menu_item.name.clone(),
            });
            line_items.push(CheckoutLineItem {
                name: menu_item.name.clone(),
                unit_amount: menu_item.price,
                quantity: line.quantity,
            });
        }

        let order = Order::place(
            restaurant.id,
            user_id,
            request.delivery_details,
            cart_items,
            Utc::now(),
        );

        let session = self
            .payments
            .create_checkout_session(CheckoutSessionRequest {
                order_id: order.id,
                restaurant_id: restaurant.id,
                line_items,
                delivery_price: restaurant.delivery_price,
                currency: self.settings.currency.clone(),
                success_url: format!("{}/order-status?success=true", self.settings.frontend_url),
                cancel_url: format!(
                    "{}/detail/{}?cancelled=true",
                    self.settings.frontend_url, restaurant.id
                ),
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, order_id = %order.id, "Checkout session creation failed");
                AppError::internal("Error creating checkout session", json!({}))
            })?;

        let url = session.url.ok_or_else(|| {
            tracing::error!(session_id = %session.id, "Checkout session has no URL");
            AppError::internal("Error creating checkout session", json!({}))
        })?;

        self.orders.insert(&order).await?;
        tracing::info!(order_id = %order.id, restaurant_id = %restaurant.id, "Order placed");

        Ok(url)
    }

    /// Applies a payment processor webhook delivery.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the signature header is missing or the
    ///   delivery fails verification; nothing is written
    /// - [`AppError::NotFound`] if a completed checkout names an unknown order
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<(), AppError> {
        let signature = signature.ok_or_else(|| {
            tracing::warn!("Webhook delivery without signature header");
            AppError::bad_request("Missing signature header", json!({}))
        })?;

        let event = self
            .payments
            .construct_event(payload, signature)
            .map_err(|e| {
                if e.is_rejected_event() {
                    tracing::warn!(error = %e, "Webhook verification failed");
                    AppError::bad_request(format!("Webhook error: {e}"), json!({}))
                } else {
                    tracing::error!(error = %e, "Webhook processing failed");
                    AppError::internal("Webhook processing failed", json!({}))
                }
            })?;

        match event {
            PaymentEvent::CheckoutCompleted {
                order_id,
                amount_total,
            } => {
                let not_found =
                    || AppError::not_found("Order not found", json!({ "orderId": order_id }));
                let id = order_id
                    .as_deref()
                    .and_then(|id| Uuid::parse_str(id).ok())
                    .ok_or_else(not_found)?;

                let order = self
                    .orders
                    .mark_paid(id, amount_total)
                    .await?
                    .ok_or_else(not_found)?;

                if order.status == OrderStatus::Paid {
                    tracing::info!(order_id = %order.id, total_amount = ?amount_total, "Order paid");
                } else {
                    tracing::info!(
                        order_id = %order.id,
                        status = %order.status,
                        "Redelivered payment event left order unchanged"
                    );
                }
                Ok(())
            }
            PaymentEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "Ignoring webhook event");
                Ok(())
            }
        }
    }

    async fn find_restaurant(&self, id: &str) -> Result<Restaurant, AppError> {
        let not_found = || AppError::not_found("Restaurant not found", json!({ "id": id }));
        let id = Uuid::parse_str(id).map_err(|_| not_found())?;

        self.restaurants.find_by_id(id).await?.ok_or_else(not_found)
    }
}
