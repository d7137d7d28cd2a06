//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{IdentityId, OrderId, OrderStatus, Price};

/// A customer order (domain type).
///
/// Total and item count are whatever the creator supplied; there is no
/// line-item entity to recompute them from.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Surrogate ID.
    pub id: OrderId,
    /// Identity that owns this order.
    pub customer_id: IdentityId,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub ordered_at: DateTime<Utc>,
    /// Order total, never negative.
    pub total: Price,
    /// Number of items, never negative.
    pub item_count: i32,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Payload for placing an order.
///
/// `customer_id` defaults to the caller; an admin may set it to place an
/// order on a customer's behalf. `ordered_at` defaults to now.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    #[serde(default)]
    pub customer_id: Option<IdentityId>,
    pub total: Price,
    pub item_count: u32,
    #[serde(default)]
    pub ordered_at: Option<DateTime<Utc>>,
}
