//! Seed the catalog from a JSON file.
//!
//! Reads categories and products from a JSON file and inserts them through
//! the store repositories. Categories that already exist (case-insensitive)
//! are skipped; products are always appended, so use `--replace` for a
//! clean slate.
//!
//! Product categories are free text by convention, so a product naming a
//! category that does not exist is inserted anyway with a warning.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::{info, warn};

use clementine_core::CategoryName;
use clementine_store::db::{self, CategoryRepository, ProductRepository};
use clementine_store::models::NewProduct;

/// Shape of the seed file.
///
/// Prices are strings (`"4.95"`), matching the wire format everywhere else.
#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    products: Vec<NewProduct>,
}

/// Seed categories and products from a JSON file.
///
/// # Arguments
///
/// * `file_path` - Path to the JSON seed file
/// * `replace` - If true, delete existing products and categories first
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot be
/// read or parsed, a seed entry is invalid, or a database operation fails.
pub async fn catalog(file_path: &str, replace: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STORE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "STORE_DATABASE_URL not set")?;

    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed from file");

    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_json::from_str(&content)?;

    info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Parsed seed file"
    );

    // Validate entries before connecting to the database
    let mut names = Vec::with_capacity(seed.categories.len());
    for raw in &seed.categories {
        let name =
            CategoryName::parse(raw).map_err(|e| format!("Invalid category '{raw}': {e}"))?;
        names.push(name);
    }
    for product in &seed.products {
        if product.name.trim().is_empty() {
            return Err("Seed file contains a product with an empty name".into());
        }
    }

    // Connect to database
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    if replace {
        warn!("Deleting existing products and categories");
        sqlx::query("DELETE FROM store.product").execute(&pool).await?;
        sqlx::query("DELETE FROM store.category").execute(&pool).await?;
    }

    let mut created = 0_usize;
    let mut existing = 0_usize;
    for name in &names {
        if categories.find_by_name(name.as_str()).await?.is_some() {
            existing += 1;
            continue;
        }
        categories.create(name).await?;
        created += 1;
    }

    let mut inserted = 0_usize;
    let mut unknown = 0_usize;
    for product in &seed.products {
        if categories.find_by_name(&product.category).await?.is_none() {
            warn!(
                product = %product.name,
                category = %product.category,
                "Product references a category that was not seeded"
            );
            unknown += 1;
        }
        products.create(product).await?;
        inserted += 1;
    }

    // Print summary
    info!("Seeding complete!");
    info!("  Categories created: {created}");
    info!("  Categories skipped (already exist): {existing}");
    info!("  Products inserted: {inserted}");
    if unknown > 0 {
        warn!("  Products with unknown categories: {unknown}");
    }

    Ok(())
}
