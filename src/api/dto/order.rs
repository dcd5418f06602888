//! DTOs for checkout and order endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::restaurant::RestaurantResponse;
use super::user::UserResponse;
use crate::application::services::{CartLine, CheckoutRequest, OrderView};
use crate::domain::entities::{CartItem, DeliveryDetails, Order, OrderStatus};

/// Request body for `POST /api/order/checkout/create-checkout-session`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    #[validate(
        required(message = "Restaurant id is required"),
        length(min = 1, message = "Restaurant id is required")
    )]
    pub restaurant_id: Option<String>,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "Cart must contain at least one item"),
        nested
    )]
    pub cart_items: Vec<CartItemRequest>,

    #[validate(required(message = "Delivery details are required"), nested)]
    pub delivery_details: Option<DeliveryDetailsRequest>,
}

impl CreateCheckoutSessionRequest {
    /// Converts a validated request. Call only after `validate()` succeeded.
    pub fn into_checkout(self) -> CheckoutRequest {
        let details = self.delivery_details.unwrap_or_default();

        CheckoutRequest {
            restaurant_id: self.restaurant_id.unwrap_or_default(),
            cart_items: self
                .cart_items
                .into_iter()
                .map(|item| CartLine {
                    menu_item_id: item.menu_item_id.unwrap_or_default(),
                    quantity: item.quantity.unwrap_or(1),
                })
                .collect(),
            delivery_details: DeliveryDetails {
                email: details.email.unwrap_or_default(),
                name: details.name.unwrap_or_default(),
                address_line1: details.address_line1.unwrap_or_default(),
                city: details.city.unwrap_or_default(),
            },
        }
    }
}

/// A cart line. `quantity` is accepted as a number or a numeric string;
/// `name` is ignored in favour of the menu's name.
#[serde_as]
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    #[validate(
        required(message = "Menu item id is required"),
        length(min = 1, message = "Menu item id is required")
    )]
    pub menu_item_id: Option<String>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    #[validate(
        required(message = "Quantity is required"),
        range(min = 1, message = "Quantity must be at least 1")
    )]
    pub quantity: Option<i64>,

    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetailsRequest {
    #[validate(
        required(message = "Email is required"),
        email(message = "Email must be a valid address")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Name is required"),
        length(min = 1, message = "Name is required")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Address line 1 is required"),
        length(min = 1, message = "Address line 1 is required")
    )]
    pub address_line1: Option<String>,

    #[validate(
        required(message = "City is required"),
        length(min = 1, message = "City is required")
    )]
    pub city: Option<String>,
}

fn known_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<OrderStatus>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_status"))
}

/// Request body for `PATCH /api/my/restaurant/order/{orderId}/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    #[validate(
        required(message = "Status is required"),
        custom(
            function = "known_status",
            message = "Status must be one of placed, paid, inProgress, outForDelivery, delivered"
        )
    )]
    pub status: Option<String>,
}

impl UpdateOrderStatusRequest {
    /// The requested status. `None` only if the request was not validated.
    pub fn status(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

/// A reference to another record: the bare id, or the record itself when
/// the endpoint expands it.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(Uuid),
    Expanded(T),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetailsResponse {
    pub email: String,
    pub name: String,
    pub address_line1: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub menu_item_id: Uuid,
    pub quantity: i64,
    pub name: String,
}

impl From<CartItem> for CartItemResponse {
    fn from(c: CartItem) -> Self {
        Self {
            menu_item_id: c.menu_item_id,
            quantity: c.quantity,
            name: c.name,
        }
    }
}

/// Order as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub restaurant: Ref<RestaurantResponse>,
    pub user: Ref<UserResponse>,
    pub delivery_details: DeliveryDetailsResponse,
    pub cart_items: Vec<CartItemResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        let d = o.delivery_details;
        Self {
            id: o.id,
            restaurant: Ref::Id(o.restaurant_id),
            user: Ref::Id(o.user_id),
            delivery_details: DeliveryDetailsResponse {
                email: d.email,
                name: d.name,
                address_line1: d.address_line1,
                city: d.city,
            },
            cart_items: o.cart_items.into_iter().map(CartItemResponse::from).collect(),
            total_amount: o.total_amount,
            status: o.status.to_string(),
            created_at: o.created_at,
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        let mut response = OrderResponse::from(view.order);
        if let Some(restaurant) = view.restaurant {
            response.restaurant = Ref::Expanded(restaurant.into());
        }
        if let Some(user) = view.user {
            response.user = Ref::Expanded(user.into());
        }
        response
    }
}
