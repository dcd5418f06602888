//! DTOs for restaurant search.

use serde::{Deserialize, Serialize};

use super::restaurant::RestaurantResponse;
use crate::application::services::{SearchPage, SearchParams};
use crate::domain::repositories::SortOption;

/// Query parameters for `GET /api/restaurant/search/{city}`.
///
/// Everything is read as text: an unparsable `page` falls back to 1 and an
/// unknown `sortOption` to best match, instead of failing the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_query: Option<String>,
    /// Comma-separated cuisine tags.
    pub selected_cuisines: Option<String>,
    pub sort_option: Option<String>,
    pub page: Option<String>,
}

impl From<SearchQuery> for SearchParams {
    fn from(q: SearchQuery) -> Self {
        SearchParams {
            search_query: q.search_query,
            selected_cuisines: q
                .selected_cuisines
                .map(|list| list.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            sort: q
                .sort_option
                .as_deref()
                .map(SortOption::from_query)
                .unwrap_or_default(),
            page: q
                .page
                .and_then(|p| p.trim().parse::<i64>().ok())
                .unwrap_or(1),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub data: Vec<RestaurantResponse>,
    pub pagination: PaginationMeta,
}

impl SearchResponse {
    /// Body sent with the 404 for a city without restaurants.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            pagination: PaginationMeta {
                total: 0,
                page: 1,
                pages: 1,
            },
        }
    }
}

impl From<SearchPage> for SearchResponse {
    fn from(page: SearchPage) -> Self {
        Self {
            data: page
                .restaurants
                .into_iter()
                .map(RestaurantResponse::from)
                .collect(),
            pagination: PaginationMeta {
                total: page.total,
                page: page.page,
                pages: page.pages,
            },
        }
    }
}
