//! Order service.
//!
//! Order placement and fulfilment status. Reads are owner-scoped; status
//! changes are admin-only.

use chrono::Utc;
use sqlx::PgPool;

use clementine_core::{OrderId, OrderStatus};
use clementine_policy::{Caller, Operation, PolicyEngine, Target};

use crate::db::{OrderRepository, PgRoleSource, ProfileRepository};
use crate::error::{Result, StoreError};
use crate::models::{NewOrder, Order};

use super::require_allowed;

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    profiles: ProfileRepository<'a>,
    policy: &'a PolicyEngine<PgRoleSource>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, policy: &'a PolicyEngine<PgRoleSource>) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            profiles: ProfileRepository::new(pool),
            policy,
        }
    }

    /// Place an order.
    ///
    /// The customer defaults to the caller; only an admin passes the
    /// insert rule with somebody else's identity in `customer_id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` on a policy denial,
    /// `StoreError::BadRequest` for an oversized item count or a customer
    /// without a profile.
    pub async fn place(&self, caller: Caller, order: NewOrder) -> Result<Order> {
        let customer = match order.customer_id {
            Some(customer) => customer,
            None => caller.identity().ok_or(StoreError::NotPermitted)?,
        };

        require_allowed(
            self.policy
                .evaluate(caller, Operation::Insert, &Target::Order { customer })
                .await,
        )?;

        // An admin ordering on a customer's behalf names an identity the
        // request never proved exists; check before writing.
        if caller.identity() != Some(customer) && self.profiles.get(customer).await?.is_none() {
            return Err(StoreError::BadRequest(format!(
                "no profile for customer {customer}"
            )));
        }

        let item_count = i32::try_from(order.item_count)
            .map_err(|_| StoreError::BadRequest("item count too large".to_string()))?;
        let ordered_at = order.ordered_at.unwrap_or_else(Utc::now);

        Ok(self
            .orders
            .create(customer, order.total, item_count, ordered_at)
            .await?)
    }

    /// Fetch an order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the order does not exist,
    /// `StoreError::NotPermitted` unless the caller owns it or is an
    /// admin.
    pub async fn get(&self, caller: Caller, id: OrderId) -> Result<Order> {
        let order = self
            .orders
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;

        require_allowed(
            self.policy
                .evaluate(
                    caller,
                    Operation::Select,
                    &Target::Order {
                        customer: order.customer_id,
                    },
                )
                .await,
        )?;

        Ok(order)
    }

    /// List orders: all of them for an admin, the caller's own otherwise.
    ///
    /// A caller whose admin status cannot be resolved still gets their own
    /// orders; only the widened view depends on the role store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` for anonymous callers.
    pub async fn list(&self, caller: Caller) -> Result<Vec<Order>> {
        let Some(identity) = caller.identity() else {
            return Err(StoreError::NotPermitted);
        };

        if self.policy.is_admin(caller).await {
            Ok(self.orders.list_all().await?)
        } else {
            Ok(self.orders.list_for_customer(identity).await?)
        }
    }

    /// Set an order's status. Admin only.
    ///
    /// Any member of the status set is accepted; there is no transition
    /// graph.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the order does not exist,
    /// `StoreError::NotPermitted` unless the caller is an admin.
    pub async fn update_status(
        &self,
        caller: Caller,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order> {
        let order = self
            .orders
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;

        require_allowed(
            self.policy
                .evaluate(
                    caller,
                    Operation::Update,
                    &Target::Order {
                        customer: order.customer_id,
                    },
                )
                .await,
        )?;

        Ok(self.orders.update_status(id, status).await?)
    }
}
