//! Category repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clementine_core::{CategoryId, CategoryName};

use super::{RepositoryError, conflict_on_unique};
use crate::models::Category;

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let name = CategoryName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category name in database: {e}"))
        })?;

        Ok(Self {
            id: CategoryId::new(row.id),
            name,
            created_at: row.created_at,
        })
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored values fail to parse.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, created_at
            FROM store.category
            ORDER BY name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored values fail to parse.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, created_at
            FROM store.category
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Category::try_from).transpose()
    }

    /// Find a category by name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored values fail to parse.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, created_at
            FROM store.category
            WHERE LOWER(name) = LOWER($1)
            ",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.map(Category::try_from).transpose()
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a category with the same name
    /// already exists, `RepositoryError::Database` for other failures.
    pub async fn create(&self, name: &CategoryName) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO store.category (name)
            VALUES ($1)
            RETURNING id, name, created_at
            ",
        )
        .bind(name.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category already exists"))?;

        row.try_into()
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category exists with the
    /// given ID.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM store.category
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
