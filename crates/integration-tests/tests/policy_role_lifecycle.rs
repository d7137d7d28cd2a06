//! Role lifecycle scenarios against an in-memory role store.
//!
//! These cover the cross-cutting behavior the per-rule unit tests cannot:
//! role grants, revocations, and store outages happening *between*
//! evaluations, where the engine must pick up the new state because it
//! re-resolves roles on every call.
//!
//! No database required; run with `cargo test -p clementine-integration-tests`.

use clementine_core::Role;
use clementine_integration_tests::{SharedRoles, engine, identity};
use clementine_policy::{Caller, Decision, DenyReason, Operation, Target};

// ============================================================================
// Grant & Revoke
// ============================================================================

/// A user asks for the admin role, is denied, an existing admin grants it
/// out of band, and the same request then succeeds.
#[tokio::test]
async fn test_role_grant_takes_effect_on_next_evaluation() {
    let roles = SharedRoles::new();
    let user = identity(1);
    let admin = identity(2);
    roles.set_role(user, Role::User).await;
    roles.set_role(admin, Role::Admin).await;

    let engine = engine(roles.clone());
    let promotion = Target::Profile {
        id: user,
        role: Role::Admin,
    };

    // Self-promotion is denied: the caller is not an admin yet.
    assert_eq!(
        engine.evaluate(user.into(), Operation::Update, &promotion).await,
        Decision::Deny(DenyReason::Forbidden)
    );

    // The admin may write the same row with the elevated role.
    assert!(engine.can(admin.into(), Operation::Update, &promotion).await);
    roles.set_role(user, Role::Admin).await;

    // The grant is live immediately; nothing was cached from the denial.
    assert!(engine.can(user.into(), Operation::Update, &promotion).await);
    assert!(engine.is_admin(user.into()).await);
}

#[tokio::test]
async fn test_revocation_takes_effect_on_next_evaluation() {
    let roles = SharedRoles::new();
    let former = identity(5);
    roles.set_role(former, Role::Admin).await;

    let engine = engine(roles.clone());

    assert!(engine.can(former.into(), Operation::Insert, &Target::Category).await);

    roles.set_role(former, Role::User).await;

    assert_eq!(
        engine
            .evaluate(former.into(), Operation::Insert, &Target::Category)
            .await,
        Decision::Deny(DenyReason::Forbidden)
    );
    assert!(!engine.is_admin(former.into()).await);
}

// ============================================================================
// Provisioning
// ============================================================================

/// An authenticated identity whose profile row has not been provisioned yet
/// is denied role-gated operations, then works normally once the row exists.
#[tokio::test]
async fn test_unprovisioned_identity_denied_until_profile_exists() {
    let roles = SharedRoles::new();
    let fresh = identity(7);

    let engine = engine(roles.clone());

    // Authenticated-only rules never consult the store and work right away.
    assert!(engine.can(fresh.into(), Operation::Select, &Target::Product).await);

    // Role-gated rules cannot resolve a role and fail closed.
    assert_eq!(
        engine
            .evaluate(fresh.into(), Operation::Insert, &Target::Category)
            .await,
        Decision::Deny(DenyReason::RoleResolution)
    );

    // Provisioning creates the row as a plain user.
    roles.set_role(fresh, Role::User).await;
    assert_eq!(
        engine
            .evaluate(fresh.into(), Operation::Insert, &Target::Category)
            .await,
        Decision::Deny(DenyReason::Forbidden)
    );

    // Deleting the profile puts the identity back in the unresolvable state.
    roles.remove(fresh).await;
    assert_eq!(
        engine
            .evaluate(fresh.into(), Operation::Insert, &Target::Category)
            .await,
        Decision::Deny(DenyReason::RoleResolution)
    );
}

// ============================================================================
// Role store outage
// ============================================================================

/// During an outage, everything that needs a role fails closed, admins
/// included, while identity-only and public rules keep working. Recovery
/// restores the old grants without any reset step.
#[tokio::test]
async fn test_outage_fails_closed_and_recovers() {
    let roles = SharedRoles::new();
    let owner = identity(1);
    let admin = identity(2);
    roles.set_role(owner, Role::User).await;
    roles.set_role(admin, Role::Admin).await;

    let engine = engine(roles.clone());
    let own_order = Target::Order { customer: owner };

    roles.set_offline(true).await;

    // The admin's privileges are unprovable and therefore gone.
    assert_eq!(
        engine
            .evaluate(admin.into(), Operation::Insert, &Target::Product)
            .await,
        Decision::Deny(DenyReason::RoleResolution)
    );
    assert!(!engine.is_admin(admin.into()).await);

    // The owner still reaches their own rows, and public image reads hold.
    assert!(engine.can(owner.into(), Operation::Select, &own_order).await);
    assert!(
        engine
            .can(
                Caller::Anonymous,
                Operation::Select,
                &Target::ProductImage {
                    bucket: clementine_integration_tests::TEST_BUCKET
                }
            )
            .await
    );

    // A stranger probing the owner's order is denied either way, but during
    // the outage the denial is a resolution failure, not a role verdict.
    assert_eq!(
        engine
            .evaluate(identity(9).into(), Operation::Select, &own_order)
            .await,
        Decision::Deny(DenyReason::RoleResolution)
    );

    roles.set_offline(false).await;

    assert!(engine.can(admin.into(), Operation::Insert, &Target::Product).await);
    assert!(engine.is_admin(admin.into()).await);
}

/// An outage between two evaluations of the same request shape affects only
/// the evaluation it overlaps. Nothing about the failure sticks.
#[tokio::test]
async fn test_outage_is_not_sticky() {
    let roles = SharedRoles::new();
    let admin = identity(2);
    roles.set_role(admin, Role::Admin).await;

    let engine = engine(roles.clone());

    assert!(engine.can(admin.into(), Operation::Delete, &Target::Product).await);

    roles.set_offline(true).await;
    assert!(!engine.can(admin.into(), Operation::Delete, &Target::Product).await);

    roles.set_offline(false).await;
    assert!(engine.can(admin.into(), Operation::Delete, &Target::Product).await);
}
