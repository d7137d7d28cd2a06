//! Test support for cross-crate scenario tests.
//!
//! # Running Tests
//!
//! ```bash
//! # Role lifecycle scenarios (in-memory, no database)
//! cargo test -p clementine-integration-tests
//!
//! # Service flows against a real database
//! export STORE_TEST_DATABASE_URL=postgres://localhost/clementine_test
//! cargo test -p clementine-integration-tests -- --ignored
//! ```
//!
//! The database-backed tests migrate the target schema themselves and use
//! unique identifiers per run, so a shared test database stays usable.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use clementine_core::{IdentityId, Role};
use clementine_policy::{PolicyEngine, RoleLookupError, RoleSource};

/// Bucket name the scenario engines are configured with.
pub const TEST_BUCKET: &str = "product-images";

/// Deterministic identity for scenario scripts.
#[must_use]
pub fn identity(n: u128) -> IdentityId {
    IdentityId::new(Uuid::from_u128(n))
}

/// An engine over a [`SharedRoles`] handle.
#[must_use]
pub fn engine(roles: SharedRoles) -> PolicyEngine<SharedRoles> {
    PolicyEngine::new(roles, TEST_BUCKET)
}

/// Mutable in-memory role store.
///
/// Clones share state: a test holds one handle while the engine holds
/// another, so grants, revocations, and simulated outages made mid-scenario
/// are visible to the next evaluation.
#[derive(Clone, Default)]
pub struct SharedRoles {
    inner: Arc<RwLock<RoleMap>>,
}

#[derive(Default)]
struct RoleMap {
    roles: HashMap<IdentityId, Role>,
    offline: bool,
}

impl SharedRoles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite an identity's role.
    pub async fn set_role(&self, identity: IdentityId, role: Role) {
        self.inner.write().await.roles.insert(identity, role);
    }

    /// Remove an identity's profile entirely.
    pub async fn remove(&self, identity: IdentityId) {
        self.inner.write().await.roles.remove(&identity);
    }

    /// Toggle a simulated role-store outage. While offline, every lookup
    /// fails; data is kept and comes back once online.
    pub async fn set_offline(&self, offline: bool) {
        self.inner.write().await.offline = offline;
    }
}

#[async_trait]
impl RoleSource for SharedRoles {
    async fn role_of(&self, identity: IdentityId) -> Result<Option<Role>, RoleLookupError> {
        let map = self.inner.read().await;
        if map.offline {
            return Err(RoleLookupError::new("role store offline"));
        }
        Ok(map.roles.get(&identity).copied())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shared_roles_visible_across_clones() {
        let roles = SharedRoles::new();
        let handle = roles.clone();
        let alice = identity(1);

        assert_eq!(roles.role_of(alice).await.unwrap(), None);
        handle.set_role(alice, Role::Admin).await;
        assert_eq!(roles.role_of(alice).await.unwrap(), Some(Role::Admin));
        handle.remove(alice).await;
        assert_eq!(roles.role_of(alice).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_offline_fails_lookups_without_losing_data() {
        let roles = SharedRoles::new();
        let alice = identity(1);
        roles.set_role(alice, Role::User).await;

        roles.set_offline(true).await;
        assert!(roles.role_of(alice).await.is_err());

        roles.set_offline(false).await;
        assert_eq!(roles.role_of(alice).await.unwrap(), Some(Role::User));
    }
}
