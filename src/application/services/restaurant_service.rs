//! Restaurant ownership, public lookup and city search.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::order_service::{OrderView, expand_orders};
use crate::domain::entities::{Order, OrderStatus, Restaurant, RestaurantDraft};
use crate::domain::repositories::{
    OrderRepository, RestaurantRepository, RestaurantSearch, SortOption, UserRepository,
};
use crate::error::AppError;
use crate::infrastructure::assets::{AssetUploader, ImageUpload};

/// Results per search page.
pub const SEARCH_PAGE_SIZE: i64 = 10;

/// Search parameters as received from the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub search_query: Option<String>,
    pub selected_cuisines: Vec<String>,
    pub sort: SortOption,
    /// 1-indexed; values below 1 are treated as 1.
    pub page: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub restaurants: Vec<Restaurant>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

pub struct RestaurantService {
    restaurants: Arc<dyn RestaurantRepository>,
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    assets: Arc<dyn AssetUploader>,
}

impl RestaurantService {
    pub fn new(
        restaurants: Arc<dyn RestaurantRepository>,
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        assets: Arc<dyn AssetUploader>,
    ) -> Self {
        Self {
            restaurants,
            orders,
            users,
            assets,
        }
    }

    fn restaurant_not_found() -> AppError {
        AppError::not_found("Restaurant not found", json!({}))
    }

    /// The caller's restaurant.
    pub async fn get_owned(&self, owner: Uuid) -> Result<Restaurant, AppError> {
        self.restaurants
            .find_by_owner(owner)
            .await?
            .ok_or_else(Self::restaurant_not_found)
    }

    /// Creates the caller's restaurant.
    ///
    /// # Errors
    ///
    /// - [`AppError::Conflict`] if the caller already owns a restaurant
    /// - [`AppError::Validation`] if no image was supplied
    /// - [`AppError::Internal`] if the image upload fails
    pub async fn create_owned(
        &self,
        owner: Uuid,
        draft: RestaurantDraft,
        image: Option<ImageUpload>,
    ) -> Result<Restaurant, AppError> {
        if self.restaurants.find_by_owner(owner).await?.is_some() {
            return Err(AppError::conflict(
                "User restaurant already exists",
                json!({}),
            ));
        }

        let image =
            image.ok_or_else(|| AppError::invalid_field("imageFile", "Image file is required"))?;
        let image_url = self.upload(image).await?;

        let restaurant = Restaurant::create(owner, draft, image_url, Utc::now());
        self.restaurants.insert(&restaurant).await?;

        tracing::info!(restaurant_id = %restaurant.id, owner = %owner, "Restaurant created");
        Ok(restaurant)
    }

    /// Replaces the caller's restaurant fields, re-uploading the image only
    /// when a new one is supplied.
    pub async fn update_owned(
        &self,
        owner: Uuid,
        draft: RestaurantDraft,
        image: Option<ImageUpload>,
    ) -> Result<Restaurant, AppError> {
        let mut restaurant = self.get_owned(owner).await?;

        let image_url = match image {
            Some(image) => Some(self.upload(image).await?),
            None => None,
        };

        restaurant.apply_draft(draft, image_url, Utc::now());
        self.restaurants.update(&restaurant).await?;

        tracing::info!(restaurant_id = %restaurant.id, "Restaurant updated");
        Ok(restaurant)
    }

    /// Every order placed at the caller's restaurant, references expanded.
    pub async fn list_owned_orders(&self, owner: Uuid) -> Result<Vec<OrderView>, AppError> {
        let restaurant = self.get_owned(owner).await?;
        let orders = self.orders.list_by_restaurant(restaurant.id).await?;

        expand_orders(orders, self.restaurants.as_ref(), self.users.as_ref()).await
    }

    /// Moves an order of the caller's restaurant to `status`.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the order does not exist
    /// - [`AppError::Unauthorized`] if the caller does not own the order's
    ///   restaurant
    /// - [`AppError::Validation`] if `status` is reserved for checkout and
    ///   payment, or would move the order backwards
    pub async fn update_order_status(
        &self,
        owner: Uuid,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, AppError> {
        let order_not_found = || AppError::not_found("Order not found", json!({}));

        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(order_not_found)?;

        let restaurant = self.restaurants.find_by_id(order.restaurant_id).await?;
        if restaurant.is_none_or(|r| r.user_id != owner) {
            tracing::warn!(order_id = %order_id, caller = %owner, "Status change by non-owner");
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Not the owner of this order's restaurant"}),
            ));
        }

        if !status.is_operator_settable() {
            return Err(AppError::invalid_field(
                "status",
                format!("Status '{status}' cannot be set by the restaurant"),
            ));
        }
        if !order.status.can_transition_to(status) {
            return Err(AppError::invalid_field(
                "status",
                format!("Cannot move order from '{}' to '{status}'", order.status),
            ));
        }

        let updated = self
            .orders
            .update_status(order_id, status)
            .await?
            .ok_or_else(order_not_found)?;

        tracing::info!(order_id = %order_id, status = %status, "Order status updated");
        Ok(updated)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Restaurant, AppError> {
        self.restaurants
            .find_by_id(id)
            .await?
            .ok_or_else(Self::restaurant_not_found)
    }

    /// Searches restaurants in `city`.
    ///
    /// Returns `Ok(None)` when no restaurant at all matches the city, before
    /// any other filter is applied.
    pub async fn search(
        &self,
        city: &str,
        params: SearchParams,
    ) -> Result<Option<SearchPage>, AppError> {
        if self.restaurants.count_by_city(city).await? == 0 {
            return Ok(None);
        }

        let page = params.page.max(1);
        let offset = (page - 1).saturating_mul(SEARCH_PAGE_SIZE);
        let search = RestaurantSearch::new(city, offset, SEARCH_PAGE_SIZE)
            .with_cuisines(params.selected_cuisines)
            .with_search_query(params.search_query)
            .with_sort(params.sort);

        let (restaurants, total) = tokio::try_join!(
            self.restaurants.search(&search),
            self.restaurants.count_matching(&search)
        )?;

        Ok(Some(SearchPage {
            restaurants,
            total,
            page,
            pages: (total + SEARCH_PAGE_SIZE - 1) / SEARCH_PAGE_SIZE,
        }))
    }

    async fn upload(&self, image: ImageUpload) -> Result<String, AppError> {
        self.assets.upload_image(image).await.map_err(|e| {
            tracing::error!(error = %e, "Image upload failed");
            AppError::internal("Image upload failed", json!({}))
        })
    }
}
