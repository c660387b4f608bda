//! # instocker-store: Storage Layer for Instocker
//!
//! This crate provides the storage backends for Instocker. It implements
//! the `Catalog`, `Ledger`, and `Checkout` ports from `instocker-core`
//! twice: once on SQLite (the real store) and once in memory (for tests
//! and ephemeral tooling).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Instocker Data Flow                              │
//! │                                                                         │
//! │  Caller (holds &dyn Catalog / Ledger / Checkout)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  instocker-store (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │   Backends    │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CatalogStore  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleLedger    │    │ 001_init.sql │  │   │
//! │  │   │ Write gate    │    │ CheckoutEngine│    │              │  │   │
//! │  │   └───────────────┘    │ MemoryStore   │    └──────────────┘  │   │
//! │  │                        └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                    ./data/instocker.db                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - SQLite backends (catalog, ledger)
//! - [`checkout`] - The atomic sale transaction
//! - [`memory`] - In-memory backend implementing the same ports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use instocker_core::{Cart, CartLine, Catalog, Checkout};
//! use instocker_store::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("./data/instocker.db")).await?;
//!
//! // Catalog work
//! let product = db.catalog().create(input, "user-1").await?;
//!
//! // Sell two of them
//! let mut cart = Cart::new();
//! cart.add_line(CartLine::for_product(&product, 2))?;
//! let sale = db.checkout().record_sale(&cart, "user-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod tests;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::CheckoutEngine;
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};

// Backend re-exports for convenience
pub use repository::catalog::CatalogStore;
pub use repository::ledger::SaleLedger;

