//! Admin role management commands.
//!
//! # Usage
//!
//! ```bash
//! # Grant the admin role to an existing profile
//! clem-cli admin grant --email ops@example.com
//! clem-cli admin grant --identity 7f0e1fae-5b1c-4d55-9c3e-2a3f8b1c9d10
//!
//! # Revoke the admin role (the profile returns to the user role)
//! clem-cli admin revoke --email ops@example.com
//!
//! # List profiles holding the admin role
//! clem-cli admin list
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! These commands write roles directly with operator credentials. The policy
//! engine only guards the HTTP surface; this is the out-of-band path that
//! bootstraps the first admin.

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use clementine_core::{Email, IdentityId, Role};
use clementine_store::db::{self, ProfileRepository, RepositoryError};
use clementine_store::models::Profile;

/// Errors that can occur during admin role operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No profile matched the selector.
    #[error("No profile found for {0}")]
    NoProfile(String),

    /// Neither selector was supplied.
    #[error("Provide --identity or --email")]
    MissingSelector,
}

/// Grant the admin role to a profile.
///
/// # Errors
///
/// Returns an error when the profile cannot be resolved or the update fails.
pub async fn grant(identity: Option<Uuid>, email: Option<String>) -> Result<(), AdminError> {
    change_role(identity, email, Role::Admin).await
}

/// Revoke the admin role from a profile, returning it to the user role.
///
/// # Errors
///
/// Returns an error when the profile cannot be resolved or the update fails.
pub async fn revoke(identity: Option<Uuid>, email: Option<String>) -> Result<(), AdminError> {
    change_role(identity, email, Role::User).await
}

/// List all profiles holding the admin role.
///
/// # Errors
///
/// Returns an error when the database connection or query fails.
pub async fn list() -> Result<(), AdminError> {
    let pool = connect().await?;
    let repo = ProfileRepository::new(&pool);

    let admins = repo.list_admins().await?;
    if admins.is_empty() {
        tracing::info!("No profiles hold the admin role");
        return Ok(());
    }

    tracing::info!("{} admin profile(s):", admins.len());
    for profile in admins {
        let email = profile.email.as_ref().map_or("-", Email::as_str);
        tracing::info!(
            "  {}  {}  since {}",
            profile.id,
            email,
            profile.created_at.date_naive()
        );
    }
    Ok(())
}

async fn change_role(
    identity: Option<Uuid>,
    email: Option<String>,
    role: Role,
) -> Result<(), AdminError> {
    let pool = connect().await?;
    let repo = ProfileRepository::new(&pool);

    let profile = resolve_profile(&repo, identity, email).await?;

    if profile.role == role {
        tracing::info!("Profile {} already has role {}", profile.id, role);
        return Ok(());
    }

    let updated = repo.set_role(profile.id, role).await?;
    tracing::info!("Profile {} role set to {}", updated.id, updated.role);
    Ok(())
}

/// Resolve a profile by identity id or by email.
///
/// clap enforces that exactly one selector is present, but the fallthrough
/// still errors rather than panicking.
async fn resolve_profile(
    repo: &ProfileRepository<'_>,
    identity: Option<Uuid>,
    email: Option<String>,
) -> Result<Profile, AdminError> {
    if let Some(raw) = identity {
        let id = IdentityId::from(raw);
        return repo
            .get(id)
            .await?
            .ok_or_else(|| AdminError::NoProfile(id.to_string()));
    }

    if let Some(raw) = email {
        let email = Email::parse(&raw).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;
        return repo
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AdminError::NoProfile(email.to_string()));
    }

    Err(AdminError::MissingSelector)
}

async fn connect() -> Result<PgPool, AdminError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STORE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingEnvVar("STORE_DATABASE_URL"))?;

    tracing::info!("Connecting to store database...");
    Ok(db::create_pool(&database_url).await?)
}
