//! Catalog service.
//!
//! Categories and products: authenticated reads, admin-only writes, plus
//! the application-level rules the policy table does not cover (duplicate
//! category names, deleting a category that products still reference).

use sqlx::PgPool;

use clementine_core::{CategoryId, CategoryName, ProductId};
use clementine_policy::{Caller, Operation, PolicyEngine, Target};

use crate::db::{CategoryRepository, PgRoleSource, ProductRepository, RepositoryError};
use crate::error::{Result, StoreError};
use crate::models::{Category, NewProduct, Product};

use super::require_allowed;

/// Catalog service.
pub struct CatalogService<'a> {
    categories: CategoryRepository<'a>,
    products: ProductRepository<'a>,
    policy: &'a PolicyEngine<PgRoleSource>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, policy: &'a PolicyEngine<PgRoleSource>) -> Self {
        Self {
            categories: CategoryRepository::new(pool),
            products: ProductRepository::new(pool),
            policy,
        }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` for anonymous callers.
    pub async fn list_categories(&self, caller: Caller) -> Result<Vec<Category>> {
        require_allowed(
            self.policy
                .evaluate(caller, Operation::Select, &Target::Category)
                .await,
        )?;
        Ok(self.categories.list().await?)
    }

    /// Create a category. Admin only.
    ///
    /// The name is trimmed before storage. Names that differ only by case
    /// count as duplicates.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` unless the caller is an admin,
    /// `StoreError::BadRequest` for an unusable name, a conflict when the
    /// name is already taken.
    pub async fn create_category(&self, caller: Caller, name: &str) -> Result<Category> {
        require_allowed(
            self.policy
                .evaluate(caller, Operation::Insert, &Target::Category)
                .await,
        )?;

        let name = CategoryName::parse(name)
            .map_err(|e| StoreError::BadRequest(format!("invalid category name: {e}")))?;

        if self.categories.find_by_name(name.as_str()).await?.is_some() {
            return Err(RepositoryError::Conflict("category already exists".to_string()).into());
        }

        Ok(self.categories.create(&name).await?)
    }

    /// Delete a category. Admin only.
    ///
    /// Rejected while any product still references the category name; this
    /// is an application rule, not a policy denial, and reads differently
    /// to the client.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` unless the caller is an admin,
    /// `StoreError::NotFound` if the category does not exist,
    /// `StoreError::CategoryInUse` while products reference it.
    pub async fn delete_category(&self, caller: Caller, id: CategoryId) -> Result<()> {
        require_allowed(
            self.policy
                .evaluate(caller, Operation::Delete, &Target::Category)
                .await,
        )?;

        let category = self
            .categories
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("category {id}")))?;

        let in_use = self.products.count_in_category(category.name.as_str()).await?;
        if in_use > 0 {
            return Err(StoreError::CategoryInUse(category.name.to_string()));
        }

        Ok(self.categories.delete(id).await?)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` for anonymous callers.
    pub async fn list_products(&self, caller: Caller) -> Result<Vec<Product>> {
        require_allowed(
            self.policy
                .evaluate(caller, Operation::Select, &Target::Product)
                .await,
        )?;
        Ok(self.products.list().await?)
    }

    /// Fetch a product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` for anonymous callers,
    /// `StoreError::NotFound` if the product does not exist.
    pub async fn get_product(&self, caller: Caller, id: ProductId) -> Result<Product> {
        require_allowed(
            self.policy
                .evaluate(caller, Operation::Select, &Target::Product)
                .await,
        )?;

        self.products
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))
    }

    /// Create a product. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` unless the caller is an admin,
    /// `StoreError::BadRequest` for an empty name or category.
    pub async fn create_product(&self, caller: Caller, mut product: NewProduct) -> Result<Product> {
        require_allowed(
            self.policy
                .evaluate(caller, Operation::Insert, &Target::Product)
                .await,
        )?;

        normalize_product(&mut product)?;
        Ok(self.products.create(&product).await?)
    }

    /// Replace a product's fields. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` unless the caller is an admin,
    /// `StoreError::BadRequest` for an empty name or category,
    /// `StoreError::Database` wrapping `NotFound` if the product does not
    /// exist.
    pub async fn update_product(
        &self,
        caller: Caller,
        id: ProductId,
        mut product: NewProduct,
    ) -> Result<Product> {
        require_allowed(
            self.policy
                .evaluate(caller, Operation::Update, &Target::Product)
                .await,
        )?;

        normalize_product(&mut product)?;
        Ok(self.products.update(id, &product).await?)
    }

    /// Delete a product. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotPermitted` unless the caller is an admin,
    /// `StoreError::Database` wrapping `NotFound` if the product does not
    /// exist.
    pub async fn delete_product(&self, caller: Caller, id: ProductId) -> Result<()> {
        require_allowed(
            self.policy
                .evaluate(caller, Operation::Delete, &Target::Product)
                .await,
        )?;

        Ok(self.products.delete(id).await?)
    }
}

/// Trim the free-text fields and reject the ones that must not be empty.
fn normalize_product(product: &mut NewProduct) -> Result<()> {
    product.name = product.name.trim().to_string();
    if product.name.is_empty() {
        return Err(StoreError::BadRequest(
            "product name cannot be empty".to_string(),
        ));
    }

    product.category = product.category.trim().to_string();
    if product.category.is_empty() {
        return Err(StoreError::BadRequest(
            "product category cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clementine_core::Price;
    use rust_decimal::Decimal;

    use super::*;

    fn sample(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category: category.to_string(),
            price: Price::new(Decimal::new(495, 2)).unwrap(),
            description: String::new(),
            image_ref: None,
        }
    }

    #[test]
    fn test_normalize_trims_fields() {
        let mut product = sample("  Blood Orange  ", " Citrus ");
        normalize_product(&mut product).unwrap();
        assert_eq!(product.name, "Blood Orange");
        assert_eq!(product.category, "Citrus");
    }

    #[test]
    fn test_normalize_rejects_blank_name() {
        let mut product = sample("   ", "Citrus");
        assert!(matches!(
            normalize_product(&mut product),
            Err(StoreError::BadRequest(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_blank_category() {
        let mut product = sample("Blood Orange", "");
        assert!(matches!(
            normalize_product(&mut product),
            Err(StoreError::BadRequest(_))
        ));
    }
}
