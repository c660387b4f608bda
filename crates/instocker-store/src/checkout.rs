//! # Checkout Engine
//!
//! The atomic sale transaction against SQLite.
//!
//! ## Two-Phase Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  record_sale(cart, user_id)                             │
//! │                                                                         │
//! │  reject empty cart, validate lines                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock write gate ──► BEGIN TRANSACTION                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PHASE 1: VALIDATE (no writes)                                         │
//! │    for each line:                                                      │
//! │      read name + quantity of the ACTIVE product                        │
//! │      ├── missing/inactive → NotFound ─────────┐                        │
//! │      └── quantity < wanted → InsufficientStock┤                        │
//! │       │                                       │                        │
//! │       ▼                                       ▼                        │
//! │  PHASE 2: WRITE                          rollback, stock               │
//! │    insert sale header                    and ledger untouched          │
//! │    for each line:                                                      │
//! │      insert item (frozen name + CART price)                            │
//! │      guarded deduct: ... AND quantity >= wanted                        │
//! │      └── 0 rows → rollback (stock moved under us)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ──► unlock gate ──► return Sale with items                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Rules
//! - `unit_price_cents` comes from the CART (the price the customer was
//!   quoted), never from the current catalog row
//! - `product_name` comes from the catalog row read in phase 1, inside the
//!   same transaction, so the frozen name is the live one at sale time

use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use async_trait::async_trait;
use instocker_core::cart::Cart;
use instocker_core::error::{StoreError, StoreResult};
use instocker_core::store::Checkout;
use instocker_core::types::{Sale, SaleItem};
use instocker_core::validation::validate_cart;

use crate::repository::ledger::{generate_sale_id, generate_sale_item_id};

/// SQLite checkout engine. Spans catalog and ledger in one transaction.
#[derive(Debug, Clone)]
pub struct CheckoutEngine {
    pool: SqlitePool,
    write_gate: Arc<Mutex<()>>,
}

impl CheckoutEngine {
    /// Creates a new CheckoutEngine sharing the handle's pool and write gate.
    pub fn new(pool: SqlitePool, write_gate: Arc<Mutex<()>>) -> Self {
        CheckoutEngine { pool, write_gate }
    }
}

#[async_trait]
impl Checkout for CheckoutEngine {
    /// Records the cart as a sale. All-or-nothing: any failing line rolls
    /// the whole transaction back.
    ///
    /// Retrying after a failure simply runs again; a second call after a
    /// success records a second sale. Callers clear the cart on success.
    async fn record_sale(&self, cart: &Cart, user_id: &str) -> StoreResult<Sale> {
        if cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        validate_cart(cart)?;

        debug!(lines = cart.line_count(), "Starting checkout");

        let _write = self.write_gate.lock().await;

        let mut tx = self.pool.begin().await?;

        // Phase 1: check every line against live stock before touching
        // anything. Names are read in the SAME transaction, so error
        // messages and item snapshots match what the database holds now.
        let mut live_names = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let row = sqlx::query_as::<_, (String, i64)>(
                "SELECT name, quantity FROM products WHERE id = ?1 AND is_active = 1",
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let (name, available) = match row {
                Some(row) => row,
                None => return Err(StoreError::not_found("Product", &line.product_id)),
            };

            if available < line.quantity {
                return Err(StoreError::insufficient_stock(
                    name,
                    available,
                    line.quantity,
                ));
            }

            live_names.push(name);
        }

        // Phase 2: write the sale, its items, and the stock deductions.
        // The guard in each UPDATE re-checks stock, which catches writers
        // outside this process and a product split across several lines.
        let sale_id = generate_sale_id();
        let now = Utc::now();
        let total = cart.total();

        sqlx::query(
            r#"
            INSERT INTO sales (id, user_id, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&sale_id)
        .bind(user_id)
        .bind(total.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(cart.lines.len());
        for (line, name) in cart.lines.iter().zip(live_names) {
            let item_id = generate_sale_item_id();

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, product_name, quantity, unit_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&item_id)
            .bind(&sale_id)
            .bind(&line.product_id)
            .bind(&name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *tx)
            .await?;

            let deducted = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - ?2, updated_at = ?3
                WHERE id = ?1 AND is_active = 1 AND quantity >= ?2
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if deducted.rows_affected() == 0 {
                // Phase 1 passed, so the row changed since: stock moved,
                // the product went inactive, or it repeats across lines
                let available: Option<i64> = sqlx::query_scalar(
                    "SELECT quantity FROM products WHERE id = ?1 AND is_active = 1",
                )
                .bind(&line.product_id)
                .fetch_optional(&mut *tx)
                .await?;

                return match available {
                    None => Err(StoreError::not_found("Product", &line.product_id)),
                    Some(available) => Err(StoreError::insufficient_stock(
                        name,
                        available,
                        line.quantity,
                    )),
                };
            }

            items.push(SaleItem {
                id: item_id,
                sale_id: sale_id.clone(),
                product_id: line.product_id.clone(),
                product_name: name,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
            });
        }

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            items = items.len(),
            total = %total,
            "Sale recorded"
        );

        Ok(Sale {
            id: sale_id,
            user_id: user_id.to_string(),
            total_cents: total.cents(),
            created_at: now,
            items,
        })
    }
}
