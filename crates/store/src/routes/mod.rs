//! HTTP route handlers for the store service.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness check
//! GET    /health/ready            - Readiness check (probes the database)
//!
//! # Profiles
//! GET    /profile                 - Caller's own profile
//! GET    /profiles                - All profiles (admin)
//! PATCH  /profiles/{id}           - Update email/role (self or admin)
//! DELETE /profiles/{id}           - Delete a profile (admin)
//!
//! # Catalog
//! GET    /categories              - List categories (authenticated)
//! POST   /categories              - Create a category (admin)
//! DELETE /categories/{id}         - Delete a category (admin, unreferenced only)
//! GET    /products                - List products (authenticated)
//! POST   /products                - Create a product (admin)
//! GET    /products/{id}           - Product detail (authenticated)
//! PUT    /products/{id}           - Replace a product (admin)
//! DELETE /products/{id}           - Delete a product (admin)
//!
//! # Orders
//! GET    /orders                  - Own orders, or all of them for an admin
//! POST   /orders                  - Place an order
//! GET    /orders/{id}             - Order detail (owner or admin)
//! PATCH  /orders/{id}/status      - Set order status (admin)
//!
//! # Hooks
//! POST   /hooks/identity-created  - Provision a profile (shared secret)
//! ```
//!
//! Caller identity arrives in the `x-identity-id` header, set by the
//! fronting auth layer. The health routes live in `main.rs`.

pub mod categories;
pub mod hooks;
pub mod orders;
pub mod products;
pub mod profiles;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/", get(profiles::index)).route(
        "/{id}",
        patch(profiles::update).delete(profiles::remove),
    )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/{id}", delete(categories::remove))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::replace)
                .delete(products::remove),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", patch(orders::update_status))
}

/// Create the provisioning hook routes router.
pub fn hook_routes() -> Router<AppState> {
    Router::new().route("/identity-created", post(hooks::identity_created))
}

/// Create all routes for the store service.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Caller's own profile
        .route("/profile", get(profiles::show_own))
        // Profile administration
        .nest("/profiles", profile_routes())
        // Catalog
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        // Orders
        .nest("/orders", order_routes())
        // Identity provider hooks
        .nest("/hooks", hook_routes())
}
