//! Order entity and its status lifecycle.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order lifecycle, in the order states are reached.
///
/// `Placed` is set at checkout, `Paid` only by a verified payment event; the
/// remaining states are driven by the restaurant operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrderStatus {
    Placed,
    Paid,
    InProgress,
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Placed,
        OrderStatus::Paid,
        OrderStatus::InProgress,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Paid => "paid",
            OrderStatus::InProgress => "inProgress",
            OrderStatus::OutForDelivery => "outForDelivery",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// States a restaurant operator may set through the API.
    pub fn is_operator_settable(&self) -> bool {
        matches!(
            self,
            OrderStatus::InProgress | OrderStatus::OutForDelivery | OrderStatus::Delivered
        )
    }

    /// Checks a transition from `self` to `target`.
    ///
    /// Moving backwards is rejected; re-applying the current state is allowed.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        target >= *self
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Where and to whom an order is delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryDetails {
    pub email: String,
    pub name: String,
    pub address_line1: String,
    pub city: String,
}

/// Snapshot of one cart line taken at checkout. Not a live reference to the
/// menu: later menu edits do not change placed orders.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub menu_item_id: Uuid,
    pub quantity: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub delivery_details: DeliveryDetails,
    pub cart_items: Vec<CartItem>,
    /// Amount reported by the payment processor, in minor units.
    pub total_amount: Option<i64>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Starts a new order in the `placed` state.
    pub fn place(
        restaurant_id: Uuid,
        user_id: Uuid,
        delivery_details: DeliveryDetails,
        cart_items: Vec<CartItem>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            restaurant_id,
            user_id,
            delivery_details,
            cart_items,
            total_amount: None,
            status: OrderStatus::Placed,
            created_at: now,
        }
    }
}
