//! Repository trait for orders.

use crate::domain::entities::{Order, OrderStatus};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for orders.
///
/// Every write touches exactly one order document; there are no
/// multi-document transactions.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgOrderRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError>;

    /// Persists a new order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, order: &Order) -> Result<(), AppError>;

    /// Orders placed by a user, oldest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError>;

    /// Orders fulfilled by a restaurant, oldest first.
    async fn list_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<Order>, AppError>;

    /// Sets the status of an order. Returns `Ok(None)` if it does not exist.
    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, AppError>;

    /// Records a completed payment: sets the processor-reported total and
    /// moves the order to `paid`.
    ///
    /// Only an order still in `placed` is written. An order already past it
    /// (a redelivered event) is returned unchanged. Returns `Ok(None)` if the
    /// order does not exist.
    async fn mark_paid(&self, id: Uuid, total_amount: Option<i64>)
    -> Result<Option<Order>, AppError>;

    /// Number of orders in each status. Statuses without orders are omitted.
    async fn count_by_status(&self) -> Result<Vec<(OrderStatus, i64)>, AppError>;
}
