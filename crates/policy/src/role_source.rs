//! Role resolution seam.

use async_trait::async_trait;
use clementine_core::{IdentityId, Role};

/// Failure to resolve a role from the authoritative store.
///
/// Carries only a message: by the time a lookup error reaches the engine
/// the response is always the same (deny and log), so the engine has no use
/// for a finer taxonomy.
#[derive(Debug, Clone, thiserror::Error)]
#[error("role lookup failed: {message}")]
pub struct RoleLookupError {
    message: String,
}

impl RoleLookupError {
    /// Wrap an underlying storage failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Source of truth for profile roles.
///
/// Implementations are privileged accessors: they read role state directly,
/// bypassing profile row visibility. The admin check inside an evaluation
/// cannot itself be subject to profile policy, or checking a non-self row
/// could never complete.
#[async_trait]
pub trait RoleSource: Send + Sync {
    /// Resolve the persisted role for an identity.
    ///
    /// Returns `Ok(None)` when the identity has no profile row.
    ///
    /// # Errors
    ///
    /// Returns [`RoleLookupError`] when the store cannot answer. The engine
    /// treats that as a denial, never as a default role.
    async fn role_of(&self, identity: IdentityId) -> Result<Option<Role>, RoleLookupError>;
}
