//! DTOs for restaurant endpoints: the owner's multipart form and the
//! public restaurant representation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::entities::{MenuItem, MenuItemDraft, Restaurant, RestaurantDraft};
use crate::infrastructure::assets::ImageUpload;

fn non_negative_integer(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<i64>() {
        Ok(n) if n >= 0 => Ok(()),
        _ => Err(ValidationError::new("non_negative_integer")),
    }
}

fn non_negative_minutes(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<i32>() {
        Ok(n) if n >= 0 => Ok(()),
        _ => Err(ValidationError::new("non_negative_integer")),
    }
}

/// One menu entry of the restaurant form, fields as submitted.
#[derive(Debug, Clone, Default, Validate)]
pub struct MenuItemForm {
    /// Existing item id; absent for new items.
    pub id: Option<String>,

    #[validate(
        required(message = "Menu item name is required"),
        length(min = 1, message = "Menu item name is required")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Menu item price is required"),
        custom(
            function = "non_negative_integer",
            message = "Menu item price must be a non-negative integer"
        )
    )]
    pub price: Option<String>,
}

/// The restaurant create/update form, assembled from multipart fields by
/// [`crate::api::extract::RestaurantMultipart`].
///
/// Text values are kept as submitted so that every field can be reported in
/// one validation pass.
#[derive(Debug, Clone, Default, Validate)]
pub struct RestaurantForm {
    #[validate(
        required(message = "Restaurant name is required"),
        length(min = 1, message = "Restaurant name is required")
    )]
    pub restaurant_name: Option<String>,

    #[validate(
        required(message = "City is required"),
        length(min = 1, message = "City is required")
    )]
    pub city: Option<String>,

    #[validate(
        required(message = "Country is required"),
        length(min = 1, message = "Country is required")
    )]
    pub country: Option<String>,

    #[validate(
        required(message = "Delivery price is required"),
        custom(
            function = "non_negative_integer",
            message = "Delivery price must be a non-negative integer"
        )
    )]
    pub delivery_price: Option<String>,

    #[validate(
        required(message = "Estimated delivery time is required"),
        custom(
            function = "non_negative_minutes",
            message = "Estimated delivery time must be a non-negative integer"
        )
    )]
    pub estimated_delivery_time: Option<String>,

    #[validate(length(min = 1, message = "Cuisines array cannot be empty"))]
    pub cuisines: Vec<String>,

    #[validate(nested)]
    pub menu_items: Vec<MenuItemForm>,

    pub image: Option<ImageUpload>,
}

impl RestaurantForm {
    /// Converts a validated form into a domain draft plus the optional image.
    ///
    /// Call only after `validate()` succeeded. A menu item id that is not a
    /// well-formed id is treated as absent, so the item receives a new id.
    pub fn into_draft(self) -> (RestaurantDraft, Option<ImageUpload>) {
        let int = |v: Option<String>| v.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0);

        let menu_items = self
            .menu_items
            .into_iter()
            .map(|item| MenuItemDraft {
                id: item.id.and_then(|id| Uuid::parse_str(id.trim()).ok()),
                name: item.name.unwrap_or_default(),
                price: int(item.price),
            })
            .collect();

        let draft = RestaurantDraft {
            restaurant_name: self.restaurant_name.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            delivery_price: int(self.delivery_price),
            estimated_delivery_time: self
                .estimated_delivery_time
                .and_then(|s| s.trim().parse::<i32>().ok())
                .unwrap_or(0),
            cuisines: self.cuisines,
            menu_items,
        };

        (draft, self.image)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItemResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub price: i64,
}

impl From<MenuItem> for MenuItemResponse {
    fn from(m: MenuItem) -> Self {
        Self {
            id: m.id,
            name: m.name,
            price: m.price,
        }
    }
}

/// Restaurant as returned by the API. `user` is the owner's id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    pub restaurant_name: String,
    pub city: String,
    pub country: String,
    pub delivery_price: i64,
    pub estimated_delivery_time: i32,
    pub cuisines: Vec<String>,
    pub menu_items: Vec<MenuItemResponse>,
    pub image_url: String,
    pub last_updated: DateTime<Utc>,
}

impl From<Restaurant> for RestaurantResponse {
    fn from(r: Restaurant) -> Self {
        Self {
            id: r.id,
            user: r.user_id,
            restaurant_name: r.restaurant_name,
            city: r.city,
            country: r.country,
            delivery_price: r.delivery_price,
            estimated_delivery_time: r.estimated_delivery_time,
            cuisines: r.cuisines,
            menu_items: r.menu_items.into_iter().map(MenuItemResponse::from).collect(),
            image_url: r.image_url,
            last_updated: r.last_updated,
        }
    }
}
