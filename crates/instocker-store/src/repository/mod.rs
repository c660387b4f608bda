//! # Repository Module
//!
//! SQLite backends for the storage ports.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Each backend hides its SQL behind a port from instocker-core.         │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.catalog().list_active()                                    │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  CatalogStore (impl Catalog)                                           │
//! │  ├── create(input, user_id)                                            │
//! │  ├── get(id)                                                           │
//! │  ├── update(id, patch)                                                 │
//! │  └── adjust_quantity(id, delta)                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Callers only see the port traits                                    │
//! │  • SQL is isolated in one place                                        │
//! │  • The in-memory backend swaps in without touching call sites          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Backends
//!
//! - [`catalog::CatalogStore`] - Product catalog and stock ledger
//! - [`ledger::SaleLedger`] - Append-only sales history

pub mod catalog;
pub mod ledger;
