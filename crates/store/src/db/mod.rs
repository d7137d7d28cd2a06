//! Database operations for the store `PostgreSQL`.
//!
//! # Schema: `store`
//!
//! ## Tables
//!
//! - `profile` - One row per authenticated identity; holds the role
//! - `category` - Catalog categories, unique by name
//! - `product` - Catalog products; `category` is free text by convention
//! - `customer_order` - Orders with supplied totals (no line items)
//!
//! Enum-valued columns (`role`, `status`) are stored as text with CHECK
//! constraints and parsed through `FromStr` on the way out, so an unknown
//! value surfaces as [`RepositoryError::DataCorruption`].
//!
//! # Migrations
//!
//! Migrations live in `crates/store/migrations/` and run via:
//! ```bash
//! cargo run -p clementine-cli -- migrate
//! ```

pub mod categories;
pub mod orders;
pub mod products;
pub mod profiles;
pub mod roles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use profiles::ProfileRepository;
pub use roles::PgRoleSource;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error to [`RepositoryError::Conflict`] when it is a unique
/// violation, passing everything else through as a database error.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}
