//! Privileged role accessor backing the policy engine.

use async_trait::async_trait;
use sqlx::PgPool;

use clementine_core::{IdentityId, Role};
use clementine_policy::{RoleLookupError, RoleSource};

/// [`RoleSource`] that reads roles straight out of `store.profile`.
///
/// This is the deliberate hole in profile visibility: the query runs with
/// the service's own database credentials and ignores who is asking. It
/// exists so the admin check inside a policy evaluation never depends on
/// the profile select policy it is part of enforcing. It returns the role
/// column and nothing else.
pub struct PgRoleSource {
    pool: PgPool,
}

impl PgRoleSource {
    /// Create a role source over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleSource for PgRoleSource {
    async fn role_of(&self, identity: IdentityId) -> Result<Option<Role>, RoleLookupError> {
        let role: Option<String> = sqlx::query_scalar(
            r"
            SELECT role
            FROM store.profile
            WHERE id = $1
            ",
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RoleLookupError::new(e.to_string()))?;

        role.map(|r| r.parse::<Role>())
            .transpose()
            .map_err(RoleLookupError::new)
    }
}
