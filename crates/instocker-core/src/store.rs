//! # Storage Ports
//!
//! Traits that storage backends implement. The core crate owns the
//! contracts; `instocker-store` ships a SQLite backend and an in-memory
//! backend, and both must behave identically from the caller's side.
//!
//! ## Port Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storage Ports                                    │
//! │                                                                         │
//! │   ┌──────────────┐     ┌──────────────┐     ┌──────────────┐           │
//! │   │   Catalog    │     │    Ledger    │     │   Checkout   │           │
//! │   │ ──────────── │     │ ──────────── │     │ ──────────── │           │
//! │   │ create       │     │ append       │     │ record_sale  │           │
//! │   │ get          │     │ history      │     │              │           │
//! │   │ update       │     └──────────────┘     └──────────────┘           │
//! │   │ soft_delete  │                                                     │
//! │   │ list_active  │     Checkout spans both: it reads the catalog,     │
//! │   │ list_low_..  │     deducts stock, and appends to the ledger in    │
//! │   │ adjust_..    │     ONE atomic step.                               │
//! │   │ count_active │                                                     │
//! │   └──────────────┘                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Traits Here?
//! Callers hold a `&dyn Catalog` (or `Ledger`, `Checkout`) and never know
//! which backend is behind it. The conformance tests in `instocker-store`
//! run the same suite against both backends through these trait objects.

use async_trait::async_trait;

use crate::cart::Cart;
use crate::error::StoreResult;
use crate::types::{NewProduct, Product, ProductPatch, Sale, SaleFilter};

// =============================================================================
// Catalog Port
// =============================================================================

/// Product catalog operations, including the stock ledger.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Creates a product for `user_id` and returns the stored entry.
    ///
    /// Assigns the ID and timestamps, derives a SKU when the input leaves
    /// it blank, and rejects a SKU the user already has.
    async fn create(&self, input: NewProduct, user_id: &str) -> StoreResult<Product>;

    /// Fetches a product by ID, regardless of its active flag.
    ///
    /// Soft-deleted products stay reachable by ID so sale history can
    /// always resolve its product references.
    async fn get(&self, id: &str) -> StoreResult<Product>;

    /// Applies a partial update and returns the fresh row.
    ///
    /// An empty patch changes nothing, not even `updated_at`.
    async fn update(&self, id: &str, patch: ProductPatch) -> StoreResult<Product>;

    /// Marks a product inactive. The row and its sale references survive.
    async fn soft_delete(&self, id: &str) -> StoreResult<()>;

    /// Lists active products, newest first.
    async fn list_active(&self) -> StoreResult<Vec<Product>>;

    /// Lists active products with stock at or below `threshold`, lowest
    /// stock first.
    async fn list_low_stock(&self, threshold: i64) -> StoreResult<Vec<Product>>;

    /// Moves stock by `delta` (positive restocks, negative removes).
    ///
    /// Fails with `InsufficientStock` when the result would go negative,
    /// leaving the stock untouched. Works on soft-deleted products too,
    /// so leftover stock can still be corrected.
    async fn adjust_quantity(&self, id: &str, delta: i64) -> StoreResult<()>;

    /// Counts active products.
    async fn count_active(&self) -> StoreResult<i64>;
}

// =============================================================================
// Ledger Port
// =============================================================================

/// Append-only sales ledger. No update, no delete.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Appends an already-built sale with its items.
    ///
    /// Rejects a sale whose `total_cents` does not equal the sum of its
    /// item subtotals. Does NOT touch stock; that is checkout's job.
    async fn append(&self, sale: &Sale) -> StoreResult<()>;

    /// Returns sales in the filter's inclusive date range, newest first,
    /// with items populated.
    async fn history(&self, filter: SaleFilter) -> StoreResult<Vec<Sale>>;
}

// =============================================================================
// Checkout Port
// =============================================================================

/// The atomic sale transaction.
#[async_trait]
pub trait Checkout: Send + Sync {
    /// Records the cart as a sale: verifies every line against live stock,
    /// deducts the stock, and appends the sale with frozen name/price
    /// snapshots.
    ///
    /// All-or-nothing: any failing line leaves stock and ledger exactly as
    /// they were. The sale's prices come from the CART's snapshots, not
    /// the current catalog.
    async fn record_sale(&self, cart: &Cart, user_id: &str) -> StoreResult<Sale>;
}
