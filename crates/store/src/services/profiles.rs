//! Profile service.
//!
//! Provisioning, self-service profile access, and admin profile
//! management, all behind the profile policy rules.

use sqlx::PgPool;

use clementine_core::{Email, IdentityId, Role};
use clementine_policy::{Caller, Operation, PolicyEngine, Target};

use crate::db::{PgRoleSource, ProfileRepository};
use crate::error::{Result, StoreError};
use crate::models::{Profile, ProfilePatch};

use super::require_allowed;

/// Profile service.
pub struct ProfileService<'a> {
    profiles: ProfileRepository<'a>,
    policy: &'a PolicyEngine<PgRoleSource>,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, policy: &'a PolicyEngine<PgRoleSource>) -> Self {
        Self {
            profiles: ProfileRepository::new(pool),
            policy,
        }
    }

    /// Provision a profile for a freshly created identity.
    ///
    /// Idempotent: re-running for an identity that already has a profile
    /// changes nothing, the stored role included. Not policy-gated; the
    /// identity provider's hook authenticates with the provisioning secret
    /// at the route boundary.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on repository failure, including a
    /// conflict when the email already belongs to another profile.
    pub async fn ensure_profile(
        &self,
        id: IdentityId,
        email: Option<&Email>,
    ) -> Result<Profile> {
        let profile = self.profiles.ensure(id, email).await?;
        tracing::debug!(identity = %id, "ensured profile");
        Ok(profile)
    }

    /// Fetch a profile.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` unless the caller is the profile
    /// owner or an admin, `StoreError::NotFound` if no profile exists.
    pub async fn get(&self, caller: Caller, id: IdentityId) -> Result<Profile> {
        // The select rule never consults the stored role
        let target = Target::Profile {
            id,
            role: Role::User,
        };
        require_allowed(self.policy.evaluate(caller, Operation::Select, &target).await)?;

        self.profiles
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))
    }

    /// List every profile. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` unless the caller is an admin.
    pub async fn list(&self, caller: Caller) -> Result<Vec<Profile>> {
        if !self.policy.is_admin(caller).await {
            return Err(StoreError::NotPermitted);
        }
        Ok(self.profiles.list().await?)
    }

    /// Apply a partial update to a profile.
    ///
    /// Fields absent from the patch keep their current values. The update
    /// rule sees the role as it would be after the write, so a non-admin
    /// patching their own profile may carry their existing `user` role
    /// forward but cannot submit `admin`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` on a policy denial,
    /// `StoreError::NotFound` if no profile exists for the identity,
    /// `StoreError::BadRequest` for an unparseable email.
    pub async fn update(
        &self,
        caller: Caller,
        id: IdentityId,
        patch: ProfilePatch,
    ) -> Result<Profile> {
        let Some(existing) = self.profiles.get(id).await? else {
            // Decide visibility of the absence the same way a real row
            // would be decided.
            let target = Target::Profile {
                id,
                role: patch.role.unwrap_or_default(),
            };
            require_allowed(self.policy.evaluate(caller, Operation::Update, &target).await)?;
            return Err(StoreError::NotFound(format!("profile {id}")));
        };

        let role = patch.role.unwrap_or(existing.role);
        let target = Target::Profile { id, role };
        require_allowed(self.policy.evaluate(caller, Operation::Update, &target).await)?;

        let email = match patch.email {
            Some(raw) => Some(
                Email::parse(&raw)
                    .map_err(|e| StoreError::BadRequest(format!("invalid email: {e}")))?,
            ),
            None => existing.email,
        };
        Ok(self.profiles.update(id, email.as_ref(), role).await?)
    }

    /// Set a profile's role.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` unless the submitted role passes
    /// the profile update rule for this caller, `StoreError::NotFound` if
    /// no profile exists for the identity.
    pub async fn set_role(&self, caller: Caller, id: IdentityId, role: Role) -> Result<Profile> {
        let target = Target::Profile { id, role };
        require_allowed(self.policy.evaluate(caller, Operation::Update, &target).await)?;

        Ok(self.profiles.set_role(id, role).await?)
    }

    /// Delete a profile and, by cascade, its orders.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` unless the caller is an admin,
    /// `StoreError::Database` wrapping `NotFound` if no profile exists.
    pub async fn delete(&self, caller: Caller, id: IdentityId) -> Result<()> {
        // Delete is admin-only; the stored role is not consulted
        let target = Target::Profile {
            id,
            role: Role::User,
        };
        require_allowed(self.policy.evaluate(caller, Operation::Delete, &target).await)?;

        Ok(self.profiles.delete(id).await?)
    }
}
