//! Public restaurant lookup and city search.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::restaurant::RestaurantResponse;
use crate::api::dto::search::{SearchQuery, SearchResponse};
use crate::api::extract::path_id;
use crate::error::AppError;
use crate::state::AppState;

/// Returns one restaurant.
///
/// # Endpoint
///
/// `GET /api/restaurant/{restaurantId}`
pub async fn get_restaurant_handler(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> Result<Json<RestaurantResponse>, AppError> {
    let id = path_id(&restaurant_id, "Restaurant")?;
    let restaurant = state.restaurant_service.get_by_id(id).await?;
    Ok(Json(restaurant.into()))
}

/// Searches restaurants delivering in a city.
///
/// # Endpoint
///
/// `GET /api/restaurant/search/{city}`
///
/// # Query Parameters
///
/// - `searchQuery`: text matched against the name or any cuisine
/// - `selectedCuisines`: comma-separated tags, all of which must match
/// - `sortOption`: `lastUpdated` (default), `deliveryPrice`,
///   `estimatedDeliveryTime`, `restaurantName`
/// - `page`: 1-indexed page of 10 results
///
/// # Response
///
/// ```json
/// {
///   "data": [ { "_id": "...", "restaurantName": "Trattoria", "...": "..." } ],
///   "pagination": { "total": 12, "page": 1, "pages": 2 }
/// }
/// ```
///
/// When no restaurant is in the city at all, responds `404` with the same
/// shape and an empty page.
pub async fn search_restaurants_handler(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    match state.restaurant_service.search(&city, query.into()).await? {
        Some(page) => Ok(Json(SearchResponse::from(page)).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Json(SearchResponse::empty())).into_response()),
    }
}
