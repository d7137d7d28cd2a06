//! The evaluation engine.

use clementine_core::Role;
use tracing::{debug, error, warn};

use crate::decision::{Decision, DenyReason};
use crate::request::{Caller, Operation, Target};
use crate::role_source::RoleSource;

/// Row-level access control engine.
///
/// One instance is shared across all requests; evaluation borrows it
/// immutably and holds no locks, so independent requests evaluate
/// concurrently. Each evaluation reads role state through the
/// [`RoleSource`] at most once, and only when identity alone cannot settle
/// the decision. Decisions reflect committed role state at call time; a
/// demotion racing an in-flight request may land after that request's
/// check, which is accepted.
pub struct PolicyEngine<S> {
    roles: S,
    image_bucket: String,
}

impl<S: RoleSource> PolicyEngine<S> {
    /// Create an engine over a role source and the configured product-image
    /// bucket name.
    pub fn new(roles: S, image_bucket: impl Into<String>) -> Self {
        Self {
            roles,
            image_bucket: image_bucket.into(),
        }
    }

    /// Name of the bucket product images live in.
    #[must_use]
    pub fn image_bucket(&self) -> &str {
        &self.image_bucket
    }

    /// Boolean form of [`evaluate`](Self::evaluate).
    pub async fn can(&self, caller: Caller, operation: Operation, target: &Target<'_>) -> bool {
        self.evaluate(caller, operation, target).await.is_allowed()
    }

    /// Evaluate one operation against one row.
    ///
    /// Never fails: a role lookup that cannot complete becomes a
    /// [`DenyReason::RoleResolution`] denial.
    pub async fn evaluate(
        &self,
        caller: Caller,
        operation: Operation,
        target: &Target<'_>,
    ) -> Decision {
        let mut probe = RoleProbe::new(&self.roles, caller);
        let decision = self.decide(caller, operation, target, &mut probe).await;

        // Resolution failures are logged by the probe at warn/error level;
        // ordinary denials stay at debug to keep the logs quiet.
        if let Decision::Deny(reason) = decision {
            if reason != DenyReason::RoleResolution {
                debug!(
                    %caller,
                    %operation,
                    resource = target.resource(),
                    %reason,
                    "operation denied"
                );
            }
        }

        decision
    }

    /// Whether the caller currently holds the admin role.
    ///
    /// This is the privileged membership check the rest of the system keys
    /// scoping on (which rows a listing returns, for example). It reads
    /// through the [`RoleSource`] directly, outside profile row visibility,
    /// and re-resolves on every call. Anonymous callers, missing profiles,
    /// and lookup failures all come back `false`.
    pub async fn is_admin(&self, caller: Caller) -> bool {
        let mut probe = RoleProbe::new(&self.roles, caller);
        matches!(probe.resolve().await, RoleState::Known(Role::Admin))
    }

    async fn decide(
        &self,
        caller: Caller,
        operation: Operation,
        target: &Target<'_>,
        probe: &mut RoleProbe<'_, S>,
    ) -> Decision {
        match *target {
            Target::Profile { id, role } => match operation {
                Operation::Select => {
                    if caller.is(id) {
                        Decision::Allow
                    } else {
                        probe.require_admin().await
                    }
                }
                // Self-service writes may not promote: a non-admin caller
                // only ever writes role=user to its own row.
                Operation::Insert | Operation::Update => {
                    if caller.is(id) && role == Role::User {
                        Decision::Allow
                    } else {
                        probe.require_admin().await
                    }
                }
                Operation::Delete => probe.require_admin().await,
            },
            Target::Category | Target::Product => match operation {
                Operation::Select => require_authenticated(caller),
                Operation::Insert | Operation::Update | Operation::Delete => {
                    probe.require_admin().await
                }
            },
            Target::Order { customer } => match operation {
                Operation::Select | Operation::Insert => {
                    if caller.is(customer) {
                        Decision::Allow
                    } else {
                        probe.require_admin().await
                    }
                }
                Operation::Update | Operation::Delete => probe.require_admin().await,
            },
            Target::ProductImage { bucket } => {
                // Objects outside the configured bucket get no grant at
                // all, public read included.
                if bucket != self.image_bucket {
                    return Decision::Deny(DenyReason::Forbidden);
                }
                match operation {
                    Operation::Select => Decision::Allow,
                    Operation::Insert | Operation::Update | Operation::Delete => {
                        probe.require_admin().await
                    }
                }
            }
        }
    }
}

const fn require_authenticated(caller: Caller) -> Decision {
    if caller.is_anonymous() {
        Decision::Deny(DenyReason::Unauthenticated)
    } else {
        Decision::Allow
    }
}

/// Resolved role state for a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleState {
    Known(Role),
    /// Authenticated caller without a profile row, or no caller at all.
    Missing,
    /// The role store could not answer.
    Unavailable,
}

/// At-most-once role lookup scoped to one evaluation.
///
/// The result is kept only for the lifetime of the evaluation that created
/// the probe; the next evaluation reads storage again.
struct RoleProbe<'a, S> {
    roles: &'a S,
    caller: Caller,
    resolved: Option<RoleState>,
}

impl<'a, S: RoleSource> RoleProbe<'a, S> {
    const fn new(roles: &'a S, caller: Caller) -> Self {
        Self {
            roles,
            caller,
            resolved: None,
        }
    }

    async fn resolve(&mut self) -> RoleState {
        if let Some(state) = self.resolved {
            return state;
        }

        let state = match self.caller.identity() {
            None => RoleState::Missing,
            Some(identity) => match self.roles.role_of(identity).await {
                Ok(Some(role)) => RoleState::Known(role),
                Ok(None) => {
                    warn!(%identity, "no profile row for authenticated identity, denying");
                    RoleState::Missing
                }
                Err(err) => {
                    error!(%identity, error = %err, "role resolution failed, denying");
                    RoleState::Unavailable
                }
            },
        };

        self.resolved = Some(state);
        state
    }

    async fn require_admin(&mut self) -> Decision {
        if self.caller.is_anonymous() {
            return Decision::Deny(DenyReason::Unauthenticated);
        }
        match self.resolve().await {
            RoleState::Known(Role::Admin) => Decision::Allow,
            RoleState::Known(Role::User) => Decision::Deny(DenyReason::Forbidden),
            RoleState::Missing | RoleState::Unavailable => {
                Decision::Deny(DenyReason::RoleResolution)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use clementine_core::IdentityId;
    use uuid::Uuid;

    use super::*;
    use crate::role_source::RoleLookupError;

    const BUCKET: &str = "product-images";

    struct StaticRoles(HashMap<IdentityId, Role>);

    impl StaticRoles {
        fn new(entries: &[(IdentityId, Role)]) -> Self {
            Self(entries.iter().copied().collect())
        }
    }

    #[async_trait]
    impl RoleSource for StaticRoles {
        async fn role_of(&self, identity: IdentityId) -> Result<Option<Role>, RoleLookupError> {
            Ok(self.0.get(&identity).copied())
        }
    }

    struct FailingRoles;

    #[async_trait]
    impl RoleSource for FailingRoles {
        async fn role_of(&self, _identity: IdentityId) -> Result<Option<Role>, RoleLookupError> {
            Err(RoleLookupError::new("store offline"))
        }
    }

    struct CountingRoles {
        inner: StaticRoles,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl RoleSource for CountingRoles {
        async fn role_of(&self, identity: IdentityId) -> Result<Option<Role>, RoleLookupError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.role_of(identity).await
        }
    }

    fn id(n: u128) -> IdentityId {
        IdentityId::new(Uuid::from_u128(n))
    }

    fn engine_with(entries: &[(IdentityId, Role)]) -> PolicyEngine<StaticRoles> {
        PolicyEngine::new(StaticRoles::new(entries), BUCKET)
    }

    #[tokio::test]
    async fn test_profile_select_self_or_admin() {
        let alice = id(1);
        let bob = id(2);
        let admin = id(3);
        let engine = engine_with(&[(alice, Role::User), (bob, Role::User), (admin, Role::Admin)]);
        let row = Target::Profile {
            id: alice,
            role: Role::User,
        };

        assert!(engine.can(alice.into(), Operation::Select, &row).await);
        assert!(engine.can(admin.into(), Operation::Select, &row).await);
        assert!(!engine.can(bob.into(), Operation::Select, &row).await);
        assert!(
            !engine
                .can(Caller::Anonymous, Operation::Select, &row)
                .await
        );
    }

    #[tokio::test]
    async fn test_profile_insert_blocks_self_promotion() {
        let alice = id(1);
        let admin = id(3);
        let engine = engine_with(&[(alice, Role::User), (admin, Role::Admin)]);

        let as_user = Target::Profile {
            id: alice,
            role: Role::User,
        };
        let as_admin = Target::Profile {
            id: alice,
            role: Role::Admin,
        };

        assert!(engine.can(alice.into(), Operation::Insert, &as_user).await);
        assert!(!engine.can(alice.into(), Operation::Insert, &as_admin).await);
        // An admin may insert a row with any role, for any identity.
        assert!(engine.can(admin.into(), Operation::Insert, &as_admin).await);
    }

    #[tokio::test]
    async fn test_profile_update_blocks_self_promotion() {
        let alice = id(1);
        let other = id(2);
        let admin = id(3);
        let engine = engine_with(&[(alice, Role::User), (other, Role::User), (admin, Role::Admin)]);

        assert!(
            engine
                .can(
                    alice.into(),
                    Operation::Update,
                    &Target::Profile {
                        id: alice,
                        role: Role::User
                    }
                )
                .await
        );
        assert!(
            !engine
                .can(
                    alice.into(),
                    Operation::Update,
                    &Target::Profile {
                        id: alice,
                        role: Role::Admin
                    }
                )
                .await
        );
        assert!(
            engine
                .can(
                    admin.into(),
                    Operation::Update,
                    &Target::Profile {
                        id: other,
                        role: Role::Admin
                    }
                )
                .await
        );
        assert!(
            !engine
                .can(
                    alice.into(),
                    Operation::Update,
                    &Target::Profile {
                        id: other,
                        role: Role::User
                    }
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_profile_delete_is_admin_only() {
        let alice = id(1);
        let admin = id(3);
        let engine = engine_with(&[(alice, Role::User), (admin, Role::Admin)]);
        let row = Target::Profile {
            id: alice,
            role: Role::User,
        };

        // Even the owner may not delete their own profile.
        assert!(!engine.can(alice.into(), Operation::Delete, &row).await);
        assert!(engine.can(admin.into(), Operation::Delete, &row).await);
    }

    #[tokio::test]
    async fn test_catalog_reads_require_authentication() {
        let alice = id(1);
        let engine = engine_with(&[(alice, Role::User)]);

        for target in [Target::Category, Target::Product] {
            assert!(engine.can(alice.into(), Operation::Select, &target).await);
            assert_eq!(
                engine
                    .evaluate(Caller::Anonymous, Operation::Select, &target)
                    .await,
                Decision::Deny(DenyReason::Unauthenticated)
            );
        }
    }

    #[tokio::test]
    async fn test_catalog_writes_are_admin_only() {
        let alice = id(1);
        let admin = id(3);
        let engine = engine_with(&[(alice, Role::User), (admin, Role::Admin)]);

        for target in [Target::Category, Target::Product] {
            for op in [Operation::Insert, Operation::Update, Operation::Delete] {
                assert!(engine.can(admin.into(), op, &target).await);
                assert_eq!(
                    engine.evaluate(alice.into(), op, &target).await,
                    Decision::Deny(DenyReason::Forbidden)
                );
                assert_eq!(
                    engine.evaluate(Caller::Anonymous, op, &target).await,
                    Decision::Deny(DenyReason::Unauthenticated)
                );
            }
        }
    }

    #[tokio::test]
    async fn test_order_owner_and_admin_access() {
        let alice = id(1);
        let bob = id(2);
        let admin = id(3);
        let engine = engine_with(&[(alice, Role::User), (bob, Role::User), (admin, Role::Admin)]);
        let order = Target::Order { customer: alice };

        // Owner can see and place their own orders.
        assert!(engine.can(alice.into(), Operation::Select, &order).await);
        assert!(engine.can(alice.into(), Operation::Insert, &order).await);
        // Another user cannot.
        assert!(!engine.can(bob.into(), Operation::Select, &order).await);
        assert!(!engine.can(bob.into(), Operation::Insert, &order).await);
        // Admin can do both, plus mutate.
        assert!(engine.can(admin.into(), Operation::Select, &order).await);
        assert!(engine.can(admin.into(), Operation::Insert, &order).await);
        assert!(engine.can(admin.into(), Operation::Update, &order).await);
        assert!(engine.can(admin.into(), Operation::Delete, &order).await);
        // The owner may not mutate after creation.
        assert!(!engine.can(alice.into(), Operation::Update, &order).await);
        assert!(!engine.can(alice.into(), Operation::Delete, &order).await);
    }

    #[tokio::test]
    async fn test_product_image_public_read_in_bucket() {
        let admin = id(3);
        let engine = engine_with(&[(admin, Role::Admin)]);
        let in_bucket = Target::ProductImage { bucket: BUCKET };
        let elsewhere = Target::ProductImage { bucket: "uploads" };

        assert!(
            engine
                .can(Caller::Anonymous, Operation::Select, &in_bucket)
                .await
        );
        // No fallthrough grant outside the configured bucket, not even for
        // admins or public reads.
        assert!(
            !engine
                .can(Caller::Anonymous, Operation::Select, &elsewhere)
                .await
        );
        assert!(!engine.can(admin.into(), Operation::Insert, &elsewhere).await);
        assert!(engine.can(admin.into(), Operation::Insert, &in_bucket).await);
    }

    #[tokio::test]
    async fn test_product_image_writes_are_admin_only() {
        let alice = id(1);
        let admin = id(3);
        let engine = engine_with(&[(alice, Role::User), (admin, Role::Admin)]);
        let in_bucket = Target::ProductImage { bucket: BUCKET };

        for op in [Operation::Insert, Operation::Update, Operation::Delete] {
            assert!(engine.can(admin.into(), op, &in_bucket).await);
            assert!(!engine.can(alice.into(), op, &in_bucket).await);
            assert!(!engine.can(Caller::Anonymous, op, &in_bucket).await);
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_denies_admin_paths() {
        let alice = id(1);
        let engine = PolicyEngine::new(FailingRoles, BUCKET);

        assert_eq!(
            engine
                .evaluate(alice.into(), Operation::Insert, &Target::Category)
                .await,
            Decision::Deny(DenyReason::RoleResolution)
        );
        assert!(!engine.is_admin(alice.into()).await);
    }

    #[tokio::test]
    async fn test_lookup_failure_spares_identity_only_rules() {
        let alice = id(1);
        let engine = PolicyEngine::new(FailingRoles, BUCKET);

        // Rules settled by identity alone never consult the role store, so
        // an outage does not lock owners out of their own rows.
        let own_order = Target::Order { customer: alice };
        assert!(engine.can(alice.into(), Operation::Select, &own_order).await);
        assert!(engine.can(alice.into(), Operation::Select, &Target::Product).await);
    }

    #[tokio::test]
    async fn test_missing_profile_denies_as_resolution_failure() {
        let ghost = id(9);
        let engine = engine_with(&[]);

        assert_eq!(
            engine
                .evaluate(ghost.into(), Operation::Insert, &Target::Category)
                .await,
            Decision::Deny(DenyReason::RoleResolution)
        );
        assert!(!engine.is_admin(ghost.into()).await);
    }

    #[tokio::test]
    async fn test_at_most_one_lookup_per_evaluation() {
        let admin = id(3);
        let roles = CountingRoles {
            inner: StaticRoles::new(&[(admin, Role::Admin)]),
            lookups: AtomicUsize::new(0),
        };
        let engine = PolicyEngine::new(roles, BUCKET);

        // Ownership allow: no lookup needed.
        let own_profile = Target::Profile {
            id: admin,
            role: Role::User,
        };
        assert!(engine.can(admin.into(), Operation::Select, &own_profile).await);
        assert_eq!(engine.roles.lookups.load(Ordering::SeqCst), 0);

        // Admin-gated operation: exactly one lookup.
        assert!(engine.can(admin.into(), Operation::Insert, &Target::Product).await);
        assert_eq!(engine.roles.lookups.load(Ordering::SeqCst), 1);

        // A second evaluation resolves again; nothing is cached across calls.
        assert!(engine.can(admin.into(), Operation::Insert, &Target::Product).await);
        assert_eq!(engine.roles.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_is_admin_reflects_current_state() {
        let alice = id(1);
        let admin = id(3);
        let engine = engine_with(&[(alice, Role::User), (admin, Role::Admin)]);

        assert!(engine.is_admin(admin.into()).await);
        assert!(!engine.is_admin(alice.into()).await);
        assert!(!engine.is_admin(Caller::Anonymous).await);
    }

    #[tokio::test]
    async fn test_anonymous_admin_paths_deny_without_lookup() {
        let roles = CountingRoles {
            inner: StaticRoles::new(&[]),
            lookups: AtomicUsize::new(0),
        };
        let engine = PolicyEngine::new(roles, BUCKET);

        assert_eq!(
            engine
                .evaluate(Caller::Anonymous, Operation::Delete, &Target::Product)
                .await,
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(engine.roles.lookups.load(Ordering::SeqCst), 0);
    }
}
