//! # In-Memory Backend
//!
//! A `HashMap`-backed implementation of all three storage ports. Used by
//! the conformance tests and anywhere an ephemeral store is enough (demo
//! tooling, scratch environments).
//!
//! ## Atomicity Without a Database
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              One Lock Stands In For The Transaction                     │
//! │                                                                         │
//! │  SQLite backend:  BEGIN ─ validate ─ write ─ COMMIT/ROLLBACK           │
//! │                                                                         │
//! │  Memory backend:  lock ── validate ─ write ── unlock                    │
//! │                   └── the whole state sits behind ONE async Mutex,     │
//! │                       held from first read to last write, so no        │
//! │                       other task can move stock in between             │
//! │                                                                         │
//! │  Rollback is free: validation finishes before the first write, and    │
//! │  nothing after the first write can fail.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both backends must stay behaviorally identical; the shared test suite
//! in this crate runs against each through the port traits.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;
use instocker_core::cart::Cart;
use instocker_core::error::{StoreError, StoreResult, ValidationError};
use instocker_core::store::{Catalog, Checkout, Ledger};
use instocker_core::types::{NewProduct, Product, ProductPatch, Sale, SaleFilter, SaleItem};
use instocker_core::validation::{validate_cart, validate_new_product, validate_product_patch};

use crate::repository::catalog::generate_product_id;
use crate::repository::ledger::{generate_sale_id, generate_sale_item_id};

/// Everything the store holds, behind one lock.
#[derive(Debug, Default)]
struct MemoryState {
    products: HashMap<String, Product>,
    sales: Vec<Sale>,
}

/// In-memory store implementing `Catalog`, `Ledger`, and `Checkout`.
///
/// Cloning is cheap and every clone shares the same state, mirroring how
/// `Database` hands out backends over one pool.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[async_trait]
impl Catalog for MemoryStore {
    async fn create(&self, input: NewProduct, user_id: &str) -> StoreResult<Product> {
        validate_new_product(&input)?;

        let id = generate_product_id();
        let now = Utc::now();
        let product = Product::new(id, user_id, input, now);

        let mut state = self.state.lock().await;

        // Same uniqueness rule as the UNIQUE(user_id, sku) index:
        // soft-deleted rows still hold their SKU
        if state
            .products
            .values()
            .any(|p| p.user_id == product.user_id && p.sku == product.sku)
        {
            return Err(StoreError::DuplicateSku { sku: product.sku });
        }

        state.products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn get(&self, id: &str) -> StoreResult<Product> {
        let state = self.state.lock().await;
        state
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> StoreResult<Product> {
        validate_product_patch(&patch)?;

        let mut state = self.state.lock().await;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;

        if patch.is_empty() {
            return Ok(product.clone());
        }

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(category) = patch.category {
            product.category = Some(category);
        }
        if let Some(price_cents) = patch.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(quantity) = patch.quantity {
            product.quantity = quantity;
        }
        if let Some(threshold) = patch.low_stock_threshold {
            product.low_stock_threshold = threshold;
        }
        product.updated_at = Utc::now();

        Ok(product.clone())
    }

    async fn soft_delete(&self, id: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;

        product.is_active = false;
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn list_active(&self) -> StoreResult<Vec<Product>> {
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn list_low_stock(&self, threshold: i64) -> StoreResult<Vec<Product>> {
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.is_active && p.quantity <= threshold)
            .cloned()
            .collect();
        products.sort_by_key(|p| p.quantity);
        Ok(products)
    }

    async fn adjust_quantity(&self, id: &str, delta: i64) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;

        let new_quantity = product.quantity + delta;
        if new_quantity < 0 {
            return Err(StoreError::insufficient_stock(
                product.name.clone(),
                product.quantity,
                -delta,
            ));
        }

        product.quantity = new_quantity;
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn count_active(&self) -> StoreResult<i64> {
        let state = self.state.lock().await;
        Ok(state.products.values().filter(|p| p.is_active).count() as i64)
    }
}

// =============================================================================
// Ledger
// =============================================================================

#[async_trait]
impl Ledger for MemoryStore {
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

        let mut state = self.state.lock().await;
        state.sales.push(sale.clone());
        Ok(())
    }

    async fn history(&self, filter: SaleFilter) -> StoreResult<Vec<Sale>> {
        let state = self.state.lock().await;
        let mut sales: Vec<Sale> = state
            .sales
            .iter()
            .filter(|s| {
                filter.start.map_or(true, |start| s.created_at >= start)
                    && filter.end.map_or(true, |end| s.created_at <= end)
            })
            .cloned()
            .collect();
        sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sales)
    }
}

// =============================================================================
// Checkout
// =============================================================================

#[async_trait]
impl Checkout for MemoryStore {
    async fn record_sale(&self, cart: &Cart, user_id: &str) -> StoreResult<Sale> {
        if cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        validate_cart(cart)?;

        // Lock held across validate + commit (see module docs)
        let mut state = self.state.lock().await;

        // A product split across several lines must fit the stock as a
        // SUM, not per line, so aggregate requirements first. SQLite gets
        // this from its guarded UPDATEs; here it must be explicit.
        let mut required: HashMap<&str, i64> = HashMap::new();
        for line in &cart.lines {
            *required.entry(line.product_id.as_str()).or_insert(0) += line.quantity;
        }

        let mut live_names = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let product = state
                .products
                .get(&line.product_id)
                .filter(|p| p.is_active)
                .ok_or_else(|| StoreError::not_found("Product", &line.product_id))?;

            let wanted = required
                .get(line.product_id.as_str())
                .copied()
                .unwrap_or(line.quantity);
            if product.quantity < wanted {
                return Err(StoreError::insufficient_stock(
                    product.name.clone(),
                    product.quantity,
                    wanted,
                ));
            }

            live_names.push(product.name.clone());
        }

        // No fallible step remains: deduct and build the sale
        let sale_id = generate_sale_id();
        let now = Utc::now();
        let total = cart.total();

        let mut items = Vec::with_capacity(cart.lines.len());
        for (line, name) in cart.lines.iter().zip(live_names) {
            if let Some(product) = state.products.get_mut(&line.product_id) {
                product.quantity -= line.quantity;
                product.updated_at = now;
            }

            items.push(SaleItem {
                id: generate_sale_item_id(),
                sale_id: sale_id.clone(),
                product_id: line.product_id.clone(),
                product_name: name,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
            });
        }

        let sale = Sale {
            id: sale_id,
            user_id: user_id.to_string(),
            total_cents: total.cents(),
            created_at: now,
            items,
        };

        state.sales.push(sale.clone());
        Ok(sale)
    }
}
