//! Profile repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use clementine_core::{Email, IdentityId, Role};

use super::{RepositoryError, conflict_on_unique};
use crate::models::Profile;

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;
        let role: Role = row
            .role
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;

        Ok(Self {
            id: IdentityId::new(row.id),
            email,
            role,
            created_at: row.created_at,
        })
    }
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored values fail to parse.
    pub async fn get(&self, id: IdentityId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, email, role, created_at
            FROM store.profile
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    /// Get a profile by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored values fail to parse.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, email, role, created_at
            FROM store.profile
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    /// List all profiles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored values fail to parse.
    pub async fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, email, role, created_at
            FROM store.profile
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Profile::try_from).collect()
    }

    /// Ensure a profile exists for an identity, creating it with role
    /// `user` if absent.
    ///
    /// Idempotent: when the row already exists nothing is written, the
    /// existing row comes back unchanged, role included. Concurrent calls
    /// for the same identity resolve to a single row via the primary-key
    /// conflict clause.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken by
    /// another profile, `RepositoryError::Database` for other failures.
    pub async fn ensure(
        &self,
        id: IdentityId,
        email: Option<&Email>,
    ) -> Result<Profile, RepositoryError> {
        let inserted = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO store.profile (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, email, role, created_at
            ",
        )
        .bind(id)
        .bind(email.map(Email::as_str))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email already in use"))?;

        if let Some(row) = inserted {
            return row.try_into();
        }

        // Conflict path: the row existed already (or a racing call just
        // created it), so read it back untouched.
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Update a profile's email and role to the given final values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile exists for the
    /// identity, `RepositoryError::Conflict` if the email is already taken.
    pub async fn update(
        &self,
        id: IdentityId,
        email: Option<&Email>,
        role: Role,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            UPDATE store.profile
            SET email = $2, role = $3
            WHERE id = $1
            RETURNING id, email, role, created_at
            ",
        )
        .bind(id)
        .bind(email.map(Email::as_str))
        .bind(role.to_string())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email already in use"))?;

        row.map_or(Err(RepositoryError::NotFound), Profile::try_from)
    }

    /// Set a profile's role, leaving everything else untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile exists for the
    /// identity.
    pub async fn set_role(&self, id: IdentityId, role: Role) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            UPDATE store.profile
            SET role = $2
            WHERE id = $1
            RETURNING id, email, role, created_at
            ",
        )
        .bind(id)
        .bind(role.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), Profile::try_from)
    }

    /// List all profiles holding the admin role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored values fail to parse.
    pub async fn list_admins(&self) -> Result<Vec<Profile>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, email, role, created_at
            FROM store.profile
            WHERE role = 'admin'
            ORDER BY created_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Profile::try_from).collect()
    }

    /// Delete a profile. Orders owned by it go with it (cascade).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile exists for the
    /// identity.
    pub async fn delete(&self, id: IdentityId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM store.profile
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
