//! # instocker-core: Pure Business Logic for Instocker
//!
//! This crate is the **heart** of Instocker. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Instocker Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       Caller / UI Layer                         │   │
//! │  │    Catalog screens ──► Cart screen ──► Sales history            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ instocker-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │ CartLine  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────────────────────────────────────────────────┐  │   │
//! │  │   │  store: Catalog / Ledger / Checkout ports (traits)      │  │   │
//! │  │   └─────────────────────────────────────────────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 instocker-store (Storage Layer)                 │   │
//! │  │          SQLite backend, in-memory backend, checkout            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - In-memory cart with frozen price snapshots
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`store`] - Storage ports implemented by backend crates
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use instocker_core::cart::{Cart, CartLine};
//! use instocker_core::money::Money;
//!
//! let mut cart = Cart::new();
//! cart.add_line(CartLine::new("prod-1", "Blue Pen", 3, 250)).unwrap();
//!
//! // 3 pens at $2.50 each = $7.50
//! assert_eq!(cart.total(), Money::from_cents(750));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use instocker_core::Money` instead of
// `use instocker_core::money::Money`

pub use cart::{Cart, CartLine};
pub use error::{StoreError, StoreResult, ValidationError};
pub use money::Money;
pub use store::{Catalog, Checkout, Ledger};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
/// Can be made configurable per-shop in future versions.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in a cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Configurable per-shop in future versions.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Low-stock threshold applied when a product does not set its own
///
/// ## Business Reason
/// Small shops rarely tune thresholds per product. Five units is a sane
/// reorder point for most counter goods.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
