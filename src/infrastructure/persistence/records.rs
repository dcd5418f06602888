//! Row and embedded-document shapes as stored in PostgreSQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entities::{
    CartItem, DeliveryDetails, MenuItem, Order, OrderStatus, Restaurant, User,
};
use crate::error::AppError;

#[derive(Debug, sqlx::FromRow)]
pub(super) struct UserRow {
    pub id: Uuid,
    pub auth0_id: String,
    pub email: String,
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            auth0_id: r.auth0_id,
            email: r.email,
            name: r.name,
            address_line1: r.address_line1,
            city: r.city,
            country: r.country,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct MenuItemRecord {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct RestaurantRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_name: String,
    pub city: String,
    pub country: String,
    pub delivery_price: i64,
    pub estimated_delivery_time: i32,
    pub cuisines: Vec<String>,
    pub menu_items: Json<Vec<MenuItemRecord>>,
    pub image_url: String,
    pub last_updated: DateTime<Utc>,
}

impl From<RestaurantRow> for Restaurant {
    fn from(r: RestaurantRow) -> Self {
        Restaurant {
            id: r.id,
            user_id: r.user_id,
            restaurant_name: r.restaurant_name,
            city: r.city,
            country: r.country,
            delivery_price: r.delivery_price,
            estimated_delivery_time: r.estimated_delivery_time,
            cuisines: r.cuisines,
            menu_items: r
                .menu_items
                .0
                .into_iter()
                .map(|m| MenuItem {
                    id: m.id,
                    name: m.name,
                    price: m.price,
                })
                .collect(),
            image_url: r.image_url,
            last_updated: r.last_updated,
        }
    }
}

pub(super) fn menu_records(restaurant: &Restaurant) -> Json<Vec<MenuItemRecord>> {
    Json(
        restaurant
            .menu_items
            .iter()
            .map(|m| MenuItemRecord {
                id: m.id,
                name: m.name.clone(),
                price: m.price,
            })
            .collect(),
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct DeliveryDetailsRecord {
    pub email: String,
    pub name: String,
    pub address_line1: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct CartItemRecord {
    pub menu_item_id: Uuid,
    pub quantity: i64,
    pub name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct OrderRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub delivery_details: Json<DeliveryDetailsRecord>,
    pub cart_items: Json<Vec<CartItemRecord>>,
    pub total_amount: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = r.status.parse().map_err(|e| {
            tracing::error!(order_id = %r.id, error = %e, "Stored order has an invalid status");
            AppError::internal("Database error", json!({}))
        })?;

        let details = r.delivery_details.0;

        Ok(Order {
            id: r.id,
            restaurant_id: r.restaurant_id,
            user_id: r.user_id,
            delivery_details: DeliveryDetails {
                email: details.email,
                name: details.name,
                address_line1: details.address_line1,
                city: details.city,
            },
            cart_items: r
                .cart_items
                .0
                .into_iter()
                .map(|c| CartItem {
                    menu_item_id: c.menu_item_id,
                    quantity: c.quantity,
                    name: c.name,
                })
                .collect(),
            total_amount: r.total_amount,
            status,
            created_at: r.created_at,
        })
    }
}

pub(super) fn delivery_record(order: &Order) -> Json<DeliveryDetailsRecord> {
    let d = &order.delivery_details;
    Json(DeliveryDetailsRecord {
        email: d.email.clone(),
        name: d.name.clone(),
        address_line1: d.address_line1.clone(),
        city: d.city.clone(),
    })
}

pub(super) fn cart_records(order: &Order) -> Json<Vec<CartItemRecord>> {
    Json(
        order
            .cart_items
            .iter()
            .map(|c| CartItemRecord {
                menu_item_id: c.menu_item_id,
                quantity: c.quantity,
                name: c.name.clone(),
            })
            .collect(),
    )
}

/// Turns user text into an `ILIKE` substring pattern, escaping the LIKE
/// metacharacters so the text is matched literally.
pub(super) fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
