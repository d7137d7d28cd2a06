//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use clementine_core::CategoryId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::CallerIdentity;
use crate::models::Category;
use crate::services::CatalogService;
use crate::state::AppState;

/// Request for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// List all categories.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` for anonymous callers.
pub async fn index(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    let service = CatalogService::new(state.pool(), state.policy());
    let categories = service.list_categories(caller).await?;
    Ok(Json(categories))
}

/// Create a category. Admin only.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` unless the caller is an admin, a
/// conflict when the name (case-insensitively) already exists.
pub async fn create(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let service = CatalogService::new(state.pool(), state.policy());
    let category = service.create_category(caller, &body.name).await?;

    add_breadcrumb(
        "catalog",
        "Created category",
        Some(&[("name", category.name.as_str())]),
    );

    Ok((StatusCode::CREATED, Json(category)))
}

/// Delete a category. Admin only; rejected while products reference it.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` unless the caller is an admin,
/// `StoreError::CategoryInUse` while products reference the name.
pub async fn remove(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    let service = CatalogService::new(state.pool(), state.policy());
    service.delete_category(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
