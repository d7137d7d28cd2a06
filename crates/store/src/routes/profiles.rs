//! Profile route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use clementine_core::IdentityId;

use crate::error::{Result, StoreError};
use crate::middleware::CallerIdentity;
use crate::models::{Profile, ProfilePatch};
use crate::services::ProfileService;
use crate::state::AppState;

/// Show the caller's own profile.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` for anonymous callers,
/// `StoreError::NotFound` if provisioning has not run for this identity.
pub async fn show_own(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Profile>> {
    let Some(identity) = caller.identity() else {
        return Err(StoreError::NotPermitted);
    };

    let service = ProfileService::new(state.pool(), state.policy());
    let profile = service.get(caller, identity).await?;
    Ok(Json(profile))
}

/// List every profile. Admin only.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` unless the caller is an admin.
pub async fn index(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<Profile>>> {
    let service = ProfileService::new(state.pool(), state.policy());
    let profiles = service.list(caller).await?;
    Ok(Json(profiles))
}

/// Update a profile's email and/or role.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` on a policy denial (a non-admin
/// submitting any role other than `user` included).
pub async fn update(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<IdentityId>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<Profile>> {
    let service = ProfileService::new(state.pool(), state.policy());
    let profile = service.update(caller, id, patch).await?;
    Ok(Json(profile))
}

/// Delete a profile. Admin only.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` unless the caller is an admin.
pub async fn remove(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<IdentityId>,
) -> Result<StatusCode> {
    let service = ProfileService::new(state.pool(), state.policy());
    service.delete(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
