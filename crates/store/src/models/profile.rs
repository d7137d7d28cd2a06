//! Profile domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{Email, IdentityId, Role};

/// A profile row (domain type).
///
/// Exactly one exists per authenticated identity, provisioned on first
/// sign-in. The role carried here is the authoritative privilege level for
/// every policy decision.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    /// The owning identity; also the primary key.
    pub id: IdentityId,
    /// Address reported by the auth provider, if any.
    pub email: Option<Email>,
    /// Privilege level. New profiles always start as `user`.
    pub role: Role,
    /// When the profile was provisioned.
    pub created_at: DateTime<Utc>,
}

/// Fields a profile update may carry.
///
/// Absent fields are left untouched. The email arrives as raw text and is
/// parsed by the service. A `role` here is what the self-promotion guard
/// inspects: non-admin callers get denied unless the submitted role is
/// `user`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub role: Option<Role>,
}
