//! Order repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clementine_core::{IdentityId, OrderId, OrderStatus, Price};

use super::RepositoryError;
use crate::models::Order;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_id: IdentityId,
    status: String,
    ordered_at: DateTime<Utc>,
    total: Price,
    item_count: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            customer_id: row.customer_id,
            status,
            ordered_at: row.ordered_at,
            total: row.total,
            item_count: row.item_count,
            created_at: row.created_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order for a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails (including
    /// when the customer profile does not exist).
    pub async fn create(
        &self,
        customer: IdentityId,
        total: Price,
        item_count: i32,
        ordered_at: DateTime<Utc>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO store.customer_order (customer_id, total, item_count, ordered_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, customer_id, status, ordered_at, total, item_count, created_at
            ",
        )
        .bind(customer)
        .bind(total)
        .bind(item_count)
        .bind(ordered_at)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored values fail to parse.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, status, ordered_at, total, item_count, created_at
            FROM store.customer_order
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// List every order in the store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored values fail to parse.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, status, ordered_at, total, item_count, created_at
            FROM store.customer_order
            ORDER BY ordered_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// List a customer's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored values fail to parse.
    pub async fn list_for_customer(
        &self,
        customer: IdentityId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, status, ordered_at, total, item_count, created_at
            FROM store.customer_order
            WHERE customer_id = $1
            ORDER BY ordered_at DESC
            ",
        )
        .bind(customer)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order exists with the
    /// given ID.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE store.customer_order
            SET status = $2
            WHERE id = $1
            RETURNING id, customer_id, status, ordered_at, total, item_count, created_at
            ",
        )
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), Order::try_from)
    }
}
