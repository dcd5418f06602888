//! PostgreSQL implementation of restaurant repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use super::records::{RestaurantRow, like_pattern, menu_records};
use crate::domain::entities::Restaurant;
use crate::domain::repositories::{RestaurantRepository, RestaurantSearch, SortOption};
use crate::error::AppError;

const RESTAURANT_COLUMNS: &str = "id, user_id, restaurant_name, city, country, delivery_price, \
     estimated_delivery_time, cuisines, menu_items, image_url, last_updated";

/// PostgreSQL repository for restaurants.
///
/// `user_id` is unique, which enforces one restaurant per owner at the
/// storage level. Search filters are assembled with [`QueryBuilder`] so that
/// every user-supplied value is a bound parameter.
pub struct PgRestaurantRepository {
    pool: Arc<PgPool>,
}

impl PgRestaurantRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Appends the `WHERE` clause shared by the page query and the count query.
fn push_search_filters(qb: &mut QueryBuilder<'_, Postgres>, search: &RestaurantSearch) {
    qb.push(" WHERE city ILIKE ")
        .push_bind(like_pattern(&search.city))
        .push(r" ESCAPE '\'");

    for cuisine in &search.cuisines {
        qb.push(" AND EXISTS (SELECT 1 FROM unnest(cuisines) AS c WHERE c ILIKE ")
            .push_bind(like_pattern(cuisine))
            .push(r" ESCAPE '\')");
    }

    if let Some(query) = &search.search_query {
        let pattern = like_pattern(query);
        qb.push(" AND (restaurant_name ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR EXISTS (SELECT 1 FROM unnest(cuisines) AS c WHERE c ILIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\'))");
    }
}

fn order_by_clause(sort: SortOption) -> &'static str {
    match sort {
        SortOption::BestMatch => " ORDER BY created_at ASC, id ASC",
        SortOption::LastUpdated => " ORDER BY last_updated ASC, id ASC",
        SortOption::DeliveryPrice => " ORDER BY delivery_price ASC, id ASC",
        SortOption::EstimatedDeliveryTime => " ORDER BY estimated_delivery_time ASC, id ASC",
        SortOption::RestaurantName => " ORDER BY restaurant_name ASC, id ASC",
    }
}

#[async_trait]
impl RestaurantRepository for PgRestaurantRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, AppError> {
        let row = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Restaurant::from))
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Option<Restaurant>, AppError> {
        let row = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Restaurant::from))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Restaurant>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Restaurant::from).collect())
    }

    async fn insert(&self, restaurant: &Restaurant) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO restaurants (
                id, user_id, restaurant_name, city, country, delivery_price,
                estimated_delivery_time, cuisines, menu_items, image_url, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(restaurant.id)
        .bind(restaurant.user_id)
        .bind(&restaurant.restaurant_name)
        .bind(&restaurant.city)
        .bind(&restaurant.country)
        .bind(restaurant.delivery_price)
        .bind(restaurant.estimated_delivery_time)
        .bind(&restaurant.cuisines)
        .bind(menu_records(restaurant))
        .bind(&restaurant.image_url)
        .bind(restaurant.last_updated)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn update(&self, restaurant: &Restaurant) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE restaurants
            SET restaurant_name = $2,
                city = $3,
                country = $4,
                delivery_price = $5,
                estimated_delivery_time = $6,
                cuisines = $7,
                menu_items = $8,
                image_url = $9,
                last_updated = $10
            WHERE id = $1
            "#,
        )
        .bind(restaurant.id)
        .bind(&restaurant.restaurant_name)
        .bind(&restaurant.city)
        .bind(&restaurant.country)
        .bind(restaurant.delivery_price)
        .bind(restaurant.estimated_delivery_time)
        .bind(&restaurant.cuisines)
        .bind(menu_records(restaurant))
        .bind(&restaurant.image_url)
        .bind(restaurant.last_updated)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Restaurant not found",
                json!({ "id": restaurant.id }),
            ));
        }

        Ok(())
    }

    async fn count_by_city(&self, city: &str) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar(r"SELECT COUNT(*) FROM restaurants WHERE city ILIKE $1 ESCAPE '\'")
                .bind(like_pattern(city))
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn search(&self, search: &RestaurantSearch) -> Result<Vec<Restaurant>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants"
        ));
        push_search_filters(&mut qb, search);
        qb.push(order_by_clause(search.sort));
        qb.push(" LIMIT ")
            .push_bind(search.limit)
            .push(" OFFSET ")
            .push_bind(search.offset);

        let rows = qb
            .build_query_as::<RestaurantRow>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Restaurant::from).collect())
    }

    async fn count_matching(&self, search: &RestaurantSearch) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM restaurants");
        push_search_filters(&mut qb, search);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM restaurants")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
