//! Repository trait for restaurants and the city search criteria.

use crate::domain::entities::Restaurant;
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Sort key for restaurant search results. Sorting is always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    /// Store order; no explicit sort key.
    BestMatch,
    #[default]
    LastUpdated,
    DeliveryPrice,
    EstimatedDeliveryTime,
    RestaurantName,
}

impl SortOption {
    /// Parses the `sortOption` query value. Unknown keys fall back to
    /// [`SortOption::BestMatch`].
    pub fn from_query(value: &str) -> Self {
        match value {
            "lastUpdated" => SortOption::LastUpdated,
            "deliveryPrice" => SortOption::DeliveryPrice,
            "estimatedDeliveryTime" => SortOption::EstimatedDeliveryTime,
            "restaurantName" => SortOption::RestaurantName,
            _ => SortOption::BestMatch,
        }
    }
}

/// Filter criteria for restaurant search.
///
/// - `city`: case-insensitive substring of the restaurant city (required)
/// - `cuisines`: every tag must match at least one cuisine (logical AND)
/// - `search_query`: matches the name OR any cuisine (logical OR)
///
/// All matching is case-insensitive substring matching on the literal text.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantSearch {
    pub city: String,
    pub cuisines: Vec<String>,
    pub search_query: Option<String>,
    pub sort: SortOption,
    pub offset: i64,
    pub limit: i64,
}

impl RestaurantSearch {
    /// Creates a city-only search with pagination parameters.
    pub fn new(city: impl Into<String>, offset: i64, limit: i64) -> Self {
        Self {
            city: city.into(),
            cuisines: Vec::new(),
            search_query: None,
            sort: SortOption::default(),
            offset,
            limit,
        }
    }

    /// Requires every given cuisine tag. Blank tags are dropped.
    pub fn with_cuisines(mut self, cuisines: Vec<String>) -> Self {
        self.cuisines = cuisines
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    /// Adds free-text matching on name or cuisine. Blank queries are ignored.
    pub fn with_search_query(mut self, query: Option<String>) -> Self {
        self.search_query = query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        self
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }
}

/// Repository interface for restaurants.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRestaurantRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, AppError>;

    /// Finds the restaurant owned by a user (at most one exists).
    async fn find_by_owner(&self, user_id: Uuid) -> Result<Option<Restaurant>, AppError>;

    /// Fetches every restaurant whose id is in `ids`. Missing ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Restaurant>, AppError>;

    /// Persists a new restaurant.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the owner already has a restaurant.
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, restaurant: &Restaurant) -> Result<(), AppError>;

    /// Overwrites an existing restaurant document.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the restaurant no longer exists.
    async fn update(&self, restaurant: &Restaurant) -> Result<(), AppError>;

    /// Counts restaurants whose city matches, ignoring all other filters.
    async fn count_by_city(&self, city: &str) -> Result<i64, AppError>;

    /// Returns one page of restaurants matching `search`.
    async fn search(&self, search: &RestaurantSearch) -> Result<Vec<Restaurant>, AppError>;

    /// Counts all restaurants matching `search`, ignoring pagination.
    async fn count_matching(&self, search: &RestaurantSearch) -> Result<i64, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}
