//! Catalog domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{CategoryId, CategoryName, Price, ProductId};

/// A product category (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    /// Surrogate ID.
    pub id: CategoryId,
    /// Unique display name; products reference it by value.
    pub name: CategoryName,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

/// A product (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Surrogate ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Category name this product belongs to. Free text by convention,
    /// not a foreign key.
    pub category: String,
    /// Unit price, never negative.
    pub price: Price,
    /// Long-form description shown on the product page.
    pub description: String,
    /// Object key of the product image in the image bucket, if any.
    pub image_ref: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_ref: Option<String>,
}
