//! # Sales Ledger Backend
//!
//! SQLite implementation of the `Ledger` port.
//!
//! ## Ledger Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Append-Only Ledger                                  │
//! │                                                                         │
//! │  1. APPEND                                                             │
//! │     └── append(sale) → header + items land in one transaction          │
//! │         (rejects a total that disagrees with its items)                │
//! │                                                                         │
//! │  2. NEVER CHANGE                                                       │
//! │     └── no UPDATE, no DELETE. A wrong sale is corrected with a         │
//! │         manual stock adjustment, the record itself stands.             │
//! │                                                                         │
//! │  3. READ BACK                                                          │
//! │     └── history(filter) → newest first, items populated                │
//! │                                                                         │
//! │  Item loading is a second query over the whole page (one round trip)   │
//! │  instead of a JOIN, so sale headers stay one row each.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use async_trait::async_trait;
use instocker_core::error::{StoreResult, ValidationError};
use instocker_core::store::Ledger;
use instocker_core::types::{Sale, SaleFilter, SaleItem};

/// SQLite backend for the sales ledger.
#[derive(Debug, Clone)]
pub struct SaleLedger {
    pool: SqlitePool,
}

impl SaleLedger {
    /// Creates a new SaleLedger.
    pub fn new(pool: SqlitePool) -> Self {
        SaleLedger { pool }
    }
}

#[async_trait]
impl Ledger for SaleLedger {
    /// Appends a sale with its items in one transaction.
    ///
    /// The header total must equal the sum of item subtotals; a sale that
    /// disagrees with its own items never reaches the database.
    async fn append(&self, sale: &Sale) -> StoreResult<()> {
        let item_total: i64 = sale
            .items
            .iter()
            .map(|i| i.quantity * i.unit_price_cents)
            .sum();
        if sale.total_cents != item_total {
            return Err(ValidationError::InvalidFormat {
                field: "total_cents".to_string(),
                reason: "does not match the sum of line subtotals".to_string(),
            }
            .into());
        }

        debug!(id = %sale.id, items = sale.items.len(), "Appending sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, user_id, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.user_id)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for item in &sale.items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, product_name, quantity, unit_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Returns sales in the filter's inclusive range, newest first.
    ///
    /// ## How Items Load
    /// 1. Fetch matching sale headers
    /// 2. Fetch every item for those sales in one IN (...) query
    /// 3. Group items back onto their sales in memory
    async fn history(&self, filter: SaleFilter) -> StoreResult<Vec<Sale>> {
        let mut qb: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("SELECT id, user_id, total_cents, created_at FROM sales WHERE 1=1");

        if let Some(start) = filter.start {
            qb.push(" AND created_at >= ");
            qb.push_bind(start);
        }
        if let Some(end) = filter.end {
            qb.push(" AND created_at <= ");
            qb.push_bind(end);
        }
        qb.push(" ORDER BY created_at DESC");

        let mut sales: Vec<Sale> = qb.build_query_as::<Sale>().fetch_all(&self.pool).await?;

        if sales.is_empty() {
            return Ok(sales);
        }

        let mut items_qb: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
            "SELECT id, sale_id, product_id, product_name, quantity, unit_price_cents \
             FROM sale_items WHERE sale_id IN (",
        );
        {
            let mut ids = items_qb.separated(", ");
            for sale in &sales {
                ids.push_bind(sale.id.clone());
            }
        }
        // rowid keeps items in insertion order within each sale
        items_qb.push(") ORDER BY sale_id, rowid");

        let items: Vec<SaleItem> = items_qb
            .build_query_as::<SaleItem>()
            .fetch_all(&self.pool)
            .await?;

        let mut by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.sale_id.clone()).or_default().push(item);
        }

        for sale in &mut sales {
            sale.items = by_sale.remove(&sale.id).unwrap_or_default();
        }

        debug!(count = sales.len(), "Loaded sales history");
        Ok(sales)
    }
}

/// Helper to generate a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}
