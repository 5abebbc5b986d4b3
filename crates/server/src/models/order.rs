//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orders_api_core::{OrderId, ProductId, UserId};

use super::Patch;

/// An order placed by a user.
///
/// Products are linked through the `order_products` table; see
/// [`crate::db::OrderProductRepository`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user.
    pub user_id: UserId,
    /// When the order was placed.
    pub order_date: DateTime<Utc>,
}

/// Validated input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    /// Defaults to the current time when absent.
    pub order_date: Option<DateTime<Utc>>,
    /// Products to link on creation, without duplicates.
    pub product_ids: Vec<ProductId>,
}

/// Validated partial update for an order.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub user_id: Patch<UserId>,
    pub order_date: Patch<DateTime<Utc>>,
}
