//! # Catalog Backend
//!
//! SQLite implementation of the `Catalog` port: product CRUD, listings,
//! and manual stock adjustments.
//!
//! ## Guarded Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  How a Stock Write Stays Safe                           │
//! │                                                                         │
//! │  adjust_quantity("p1", -3)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock write gate (serializes in-process writers)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products                                                       │
//! │     SET quantity = quantity + (-3)                                     │
//! │   WHERE id = 'p1' AND quantity + (-3) >= 0   ← the guard               │
//! │       │                                                                 │
//! │       ├── 1 row changed → done                                         │
//! │       │                                                                 │
//! │       └── 0 rows changed → re-read the row:                            │
//! │              row missing        → NotFound                             │
//! │              quantity too small → InsufficientStock                    │
//! │                                                                         │
//! │  The guard lives in the WHERE clause, so even a write from another     │
//! │  process between our read and our update cannot take stock negative.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use async_trait::async_trait;
use instocker_core::error::{StoreError, StoreResult};
use instocker_core::store::Catalog;
use instocker_core::types::{NewProduct, Product, ProductPatch};
use instocker_core::validation::{validate_new_product, validate_product_patch};

/// SQLite backend for the product catalog.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = db.catalog();
///
/// let product = catalog.create(input, "user-1").await?;
/// catalog.adjust_quantity(&product.id, 12).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
    write_gate: Arc<Mutex<()>>,
}

impl CatalogStore {
    /// Creates a new CatalogStore sharing the handle's pool and write gate.
    pub fn new(pool: SqlitePool, write_gate: Arc<Mutex<()>>) -> Self {
        CatalogStore { pool, write_gate }
    }
}

#[async_trait]
impl Catalog for CatalogStore {
    /// Creates a product.
    ///
    /// ## What This Does
    /// 1. Validates the input (name, optional SKU, price, stock, threshold)
    /// 2. Assigns a fresh UUID and both timestamps
    /// 3. Derives the SKU from the ID when the input leaves it blank
    /// 4. Inserts; a UNIQUE collision on (user_id, sku) becomes DuplicateSku
    async fn create(&self, input: NewProduct, user_id: &str) -> StoreResult<Product> {
        validate_new_product(&input)?;

        let id = generate_product_id();
        let now = Utc::now();
        let product = Product::new(id, user_id, input, now);

        debug!(id = %product.id, sku = %product.sku, "Creating product");

        let insert = sqlx::query(
            r#"
            INSERT INTO products (
                id, user_id, name, sku, category,
                price_cents, quantity, low_stock_threshold,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.user_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.low_stock_threshold)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await;

        match insert {
            Ok(_) => Ok(product),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateSku { sku: product.sku })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetches a product by ID, active or not.
    async fn get(&self, id: &str) -> StoreResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, user_id, name, sku, category,
                price_cents, quantity, low_stock_threshold,
                is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| StoreError::not_found("Product", id))
    }

    /// Applies a partial update and returns the fresh row.
    ///
    /// The UPDATE is assembled from only the fields present in the patch,
    /// plus `updated_at`. An empty patch skips the UPDATE entirely, which
    /// also leaves `updated_at` alone.
    async fn update(&self, id: &str, patch: ProductPatch) -> StoreResult<Product> {
        validate_product_patch(&patch)?;

        if patch.is_empty() {
            debug!(id = %id, "Empty patch, returning current row");
            return self.get(id).await;
        }

        debug!(id = %id, "Updating product");

        // An absolute stock overwrite competes with checkout's deductions
        let _write = if patch.quantity.is_some() {
            Some(self.write_gate.lock().await)
        } else {
            None
        };

        let now = Utc::now();

        let mut qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE products SET ");
        let mut fields = qb.separated(", ");

        if let Some(name) = &patch.name {
            fields.push("name = ");
            fields.push_bind_unseparated(name.as_str());
        }
        if let Some(category) = &patch.category {
            fields.push("category = ");
            fields.push_bind_unseparated(category.as_str());
        }
        if let Some(price_cents) = patch.price_cents {
            fields.push("price_cents = ");
            fields.push_bind_unseparated(price_cents);
        }
        if let Some(quantity) = patch.quantity {
            fields.push("quantity = ");
            fields.push_bind_unseparated(quantity);
        }
        if let Some(threshold) = patch.low_stock_threshold {
            fields.push("low_stock_threshold = ");
            fields.push_bind_unseparated(threshold);
        }
        fields.push("updated_at = ");
        fields.push_bind_unseparated(now);

        qb.push(" WHERE id = ");
        qb.push_bind(id);

        let result = qb.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        self.get(id).await
    }

    /// Soft-deletes a product by setting is_active = 0.
    ///
    /// ## Why Soft Delete?
    /// - Historical sales still reference this product
    /// - Can be restored by hand if deleted by mistake
    ///
    /// Deleting an already-inactive product succeeds again (idempotent);
    /// only a missing row is an error.
    async fn soft_delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_active = 0, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Lists active products, newest first.
    async fn list_active(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, user_id, name, sku, category,
                price_cents, quantity, low_stock_threshold,
                is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed active products");
        Ok(products)
    }

    /// Lists active products with stock at or below `threshold`, lowest
    /// stock first.
    async fn list_low_stock(&self, threshold: i64) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, user_id, name, sku, category,
                price_cents, quantity, low_stock_threshold,
                is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1 AND quantity <= ?1
            ORDER BY quantity ASC
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            threshold = threshold,
            count = products.len(),
            "Listed low-stock products"
        );
        Ok(products)
    }

    /// Moves stock by `delta` with the non-negative guard in the WHERE
    /// clause (see module docs).
    ///
    /// Works on soft-deleted rows too: leftover stock on a retired product
    /// still needs correcting.
    async fn adjust_quantity(&self, id: &str, delta: i64) -> StoreResult<()> {
        debug!(id = %id, delta = delta, "Adjusting stock");

        let _write = self.write_gate.lock().await;

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?2, updated_at = ?3
            WHERE id = ?1 AND quantity + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the row is missing or the delta would go negative;
            // read the row to tell which
            let row = sqlx::query_as::<_, (String, i64)>(
                "SELECT name, quantity FROM products WHERE id = ?1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            return match row {
                None => Err(StoreError::not_found("Product", id)),
                Some((name, available)) => {
                    Err(StoreError::insufficient_stock(name, available, -delta))
                }
            };
        }

        Ok(())
    }

    /// Counts active products.
    async fn count_active(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
///
/// ## Usage
/// ```rust,ignore
/// let id = generate_product_id();
/// let product = Product::new(id, user_id, input, now);
/// ```
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
