//! PostgreSQL implementation of order repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::records::{OrderRow, cart_records, delivery_record};
use crate::domain::entities::{Order, OrderStatus};
use crate::domain::repositories::OrderRepository;
use crate::error::AppError;

const ORDER_COLUMNS: &str =
    "id, restaurant_id, user_id, delivery_details, cart_items, total_amount, status, created_at";

/// PostgreSQL repository for orders.
pub struct PgOrderRepository {
    pool: Arc<PgPool>,
}

impl PgOrderRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, AppError> {
    rows.into_iter().map(Order::try_from).collect()
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn insert(&self, order: &Order) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, restaurant_id, user_id, delivery_details, cart_items,
                total_amount, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order.id)
        .bind(order.restaurant_id)
        .bind(order.user_id)
        .bind(delivery_record(order))
        .bind(cart_records(order))
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        into_orders(rows)
    }

    async fn list_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE restaurant_id = $1 \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(restaurant_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        into_orders(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        total_amount: Option<i64>,
    ) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET total_amount = $2, status = $3 \
             WHERE id = $1 AND status = $4 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(total_amount)
        .bind(OrderStatus::Paid.as_str())
        .bind(OrderStatus::Placed.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => Order::try_from(row).map(Some),
            None => self.find_by_id(id).await,
        }
    }

    async fn count_by_status(&self) -> Result<Vec<(OrderStatus, i64)>, AppError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
                .fetch_all(self.pool.as_ref())
                .await?;

        let mut counts: Vec<(OrderStatus, i64)> = rows
            .into_iter()
            .filter_map(|(status, count)| match status.parse::<OrderStatus>() {
                Ok(status) => Some((status, count)),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unknown status in order stats");
                    None
                }
            })
            .collect();
        counts.sort_by_key(|(status, _)| *status);

        Ok(counts)
    }
}
