//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! clem-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Store migrations live in `crates/store/migrations/` and are embedded into
//! the binary at compile time, so the CLI can migrate a database without the
//! source tree present.

use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run store database migrations.
///
/// # Errors
///
/// Returns an error when the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn store() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STORE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("STORE_DATABASE_URL"))?;

    tracing::info!("Connecting to store database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running store migrations...");
    sqlx::migrate!("../store/migrations").run(&pool).await?;

    tracing::info!("Store migrations complete!");
    Ok(())
}
