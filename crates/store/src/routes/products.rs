//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use clementine_core::ProductId;

use crate::error::Result;
use crate::middleware::CallerIdentity;
use crate::models::{NewProduct, Product};
use crate::services::CatalogService;
use crate::state::AppState;

/// List all products.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` for anonymous callers.
pub async fn index(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let service = CatalogService::new(state.pool(), state.policy());
    let products = service.list_products(caller).await?;
    Ok(Json(products))
}

/// Show a product.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` for anonymous callers,
/// `StoreError::NotFound` if the product does not exist.
pub async fn show(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let service = CatalogService::new(state.pool(), state.policy());
    let product = service.get_product(caller, id).await?;
    Ok(Json(product))
}

/// Create a product. Admin only.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` unless the caller is an admin,
/// `StoreError::BadRequest` for an empty name or category.
pub async fn create(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let service = CatalogService::new(state.pool(), state.policy());
    let product = service.create_product(caller, body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product. Admin only.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` unless the caller is an admin,
/// `StoreError::BadRequest` for an empty name or category.
pub async fn replace(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<NewProduct>,
) -> Result<Json<Product>> {
    let service = CatalogService::new(state.pool(), state.policy());
    let product = service.update_product(caller, id, body).await?;
    Ok(Json(product))
}

/// Delete a product. Admin only.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` unless the caller is an admin.
pub async fn remove(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let service = CatalogService::new(state.pool(), state.policy());
    service.delete_product(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
