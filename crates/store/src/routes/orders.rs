//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use clementine_core::{OrderId, OrderStatus};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::CallerIdentity;
use crate::models::{NewOrder, Order};
use crate::services::OrderService;
use crate::state::AppState;

/// Request for setting an order's status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// List orders: the caller's own, or every order for an admin.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` for anonymous callers.
pub async fn index(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let service = OrderService::new(state.pool(), state.policy());
    let orders = service.list(caller).await?;
    Ok(Json(orders))
}

/// Place an order.
///
/// # Errors
///
/// Returns `StoreError::NotPermitted` on a policy denial (placing for
/// another customer without the admin role included).
pub async fn create(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Json(body): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    let service = OrderService::new(state.pool(), state.policy());
    let order = service.place(caller, body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Show an order.
///
/// # Errors
///
/// Returns `StoreError::NotFound` if the order does not exist,
/// `StoreError::NotPermitted` unless the caller owns it or is an admin.
pub async fn show(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let service = OrderService::new(state.pool(), state.policy());
    let order = service.get(caller, id).await?;
    Ok(Json(order))
}

/// Set an order's status. Admin only.
///
/// # Errors
///
/// Returns `StoreError::NotFound` if the order does not exist,
/// `StoreError::NotPermitted` unless the caller is an admin.
pub async fn update_status(
    CallerIdentity(caller): CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let service = OrderService::new(state.pool(), state.policy());
    let order = service.update_status(caller, id, body.status).await?;

    let order_id = id.to_string();
    let status = body.status.to_string();
    add_breadcrumb(
        "orders",
        "Updated order status",
        Some(&[("order", &order_id), ("status", &status)]),
    );

    Ok(Json(order))
}
