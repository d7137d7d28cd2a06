//! Product repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clementine_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::{NewProduct, Product};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    category: String,
    price: Price,
    description: String,
    image_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            description: row.description,
            image_ref: row.image_ref,
            created_at: row.created_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, price, description, image_ref, created_at
            FROM store.product
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, price, description, image_ref, created_at
            FROM store.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO store.product (name, category, price, description, image_ref)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, category, price, description, image_ref, created_at
            ",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.image_ref.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace a product's fields with the given values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product exists with the
    /// given ID.
    pub async fn update(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE store.product
            SET name = $2, category = $3, price = $4, description = $5, image_ref = $6
            WHERE id = $1
            RETURNING id, name, category, price, description, image_ref, created_at
            ",
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.image_ref.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product exists with the
    /// given ID.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM store.product
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

    /// Count products referencing a category name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_in_category(&self, category: &str) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM store.product
            WHERE LOWER(category) = LOWER($1)
            ",
        )
        .bind(category)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
