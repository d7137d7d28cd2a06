//! Identity provider hooks.
//!
//! The auth provider calls `POST /hooks/identity-created` after issuing a
//! new identity. The request authenticates with a shared secret header
//! rather than a caller identity, so it bypasses the policy engine; the
//! handler provisions the profile idempotently.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use secrecy::ExposeSecret;
use serde::Deserialize;

use clementine_core::{Email, IdentityId};

use crate::error::{Result, StoreError};
use crate::models::Profile;
use crate::services::ProfileService;
use crate::state::AppState;

/// Header carrying the provisioning shared secret.
pub const PROVISIONING_SECRET_HEADER: &str = "x-provisioning-secret";

/// Payload of the identity-created hook.
#[derive(Debug, Deserialize)]
pub struct IdentityCreatedRequest {
    pub id: IdentityId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Provision a profile for a freshly created identity.
///
/// Idempotent: replaying the hook for a known identity returns the
/// existing profile untouched, role included.
///
/// # Errors
///
/// Returns `StoreError::Unauthorized` without a matching secret,
/// `StoreError::BadRequest` for an unparseable email, a conflict when the
/// email already belongs to another profile.
pub async fn identity_created(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<IdentityCreatedRequest>,
) -> Result<Json<Profile>> {
    let presented = headers
        .get(PROVISIONING_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| StoreError::Unauthorized("missing provisioning secret".to_string()))?;

    let expected = state.config().provisioning_secret.expose_secret();
    if !constant_time_compare(presented, expected) {
        tracing::warn!("provisioning hook presented a bad secret");
        return Err(StoreError::Unauthorized(
            "bad provisioning secret".to_string(),
        ));
    }

    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| StoreError::BadRequest(format!("invalid email: {e}")))?;

    let service = ProfileService::new(state.pool(), state.policy());
    let profile = service.ensure_profile(body.id, email.as_ref()).await?;

    Ok(Json(profile))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hello", "helloo"));
    }
}
