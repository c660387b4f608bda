//! # Domain Types
//!
//! Core domain types used throughout Instocker.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  user_id        │   │  sale_id (FK)   │       │
//! │  │  name           │   │  total_cents    │   │  product_name   │       │
//! │  │  price_cents    │   │  items          │   │  unit_price     │       │
//! │  │  quantity       │   │  created_at     │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   NewProduct    │   │  ProductPatch   │   │   SaleFilter    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  create input   │   │  partial update │   │  history range  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every product has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `sku`: business identifier - human-readable, unique per user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::DEFAULT_LOW_STOCK_THRESHOLD;

// =============================================================================
// Product
// =============================================================================

/// A product in the shop's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owner of this catalog entry.
    pub user_id: String,

    /// Display name shown in listings and on receipts.
    pub name: String,

    /// Stock Keeping Unit - business identifier, unique per user.
    pub sku: String,

    /// Optional free-text category for grouping.
    pub category: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Units currently on hand. Never negative.
    pub quantity: i64,

    /// Stock level at or below which the product counts as low.
    pub low_stock_threshold: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds a fresh catalog entry from creation input.
    ///
    /// The SKU falls back to a prefix of the ID when the input leaves it
    /// blank, and the low-stock threshold falls back to
    /// [`DEFAULT_LOW_STOCK_THRESHOLD`].
    pub fn new(id: String, user_id: &str, input: NewProduct, now: DateTime<Utc>) -> Self {
        let sku = input.sku_or_derived(&id);
        Product {
            id,
            user_id: user_id.to_string(),
            name: input.name,
            sku,
            category: input.category,
            price_cents: input.price_cents,
            quantity: input.quantity,
            low_stock_threshold: input
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if stock is at or below the low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

// =============================================================================
// New Product Input
// =============================================================================

/// Input for creating a product.
///
/// ID, owner, and timestamps are assigned by the store, never by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,

    /// Optional explicit SKU. Blank or absent means "derive one from the ID".
    pub sku: Option<String>,

    pub category: Option<String>,

    pub price_cents: i64,

    /// Initial stock on hand.
    pub quantity: i64,

    /// Absent means [`DEFAULT_LOW_STOCK_THRESHOLD`].
    pub low_stock_threshold: Option<i64>,
}

impl NewProduct {
    /// Resolves the SKU for this input: the explicit one (trimmed) when
    /// provided and non-blank, otherwise the first 8 characters of the
    /// product ID, uppercased.
    pub fn sku_or_derived(&self, id: &str) -> String {
        match self
            .sku
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(sku) => sku.to_string(),
            None => id.chars().take(8).collect::<String>().to_uppercase(),
        }
    }
}

// =============================================================================
// Product Patch
// =============================================================================

/// Partial update for a product. Absent fields keep their current value.
///
/// SKU and ownership are immutable after creation, so they have no patch
/// field. Clearing a category back to NULL is not supported through a
/// patch; set a new value instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
}

impl ProductPatch {
    /// True when no field is set. An empty patch leaves the row untouched.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price_cents.is_none()
            && self.quantity.is_none()
            && self.low_stock_threshold.is_none()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale transaction.
///
/// Sales are immutable once recorded. There is no draft state and no
/// voiding; a mistake is corrected with a manual stock adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// User who recorded the sale.
    pub user_id: String,

    /// Grand total in cents. Always equals the sum of item subtotals.
    pub total_cents: i64,

    /// When the sale was recorded.
    pub created_at: DateTime<Utc>,

    /// Line items. Loaded separately from the sale header, so row mapping
    /// skips this field and history queries fill it in afterwards.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Returns the grand total as a Money type.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// Uses the snapshot pattern: `product_name` and `unit_price_cents` are
/// frozen at the moment of sale, so later catalog edits never rewrite
/// history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Sale this item belongs to.
    pub sale_id: String,

    /// Product that was sold. Points at the catalog row, which may have
    /// changed or been soft-deleted since.
    pub product_id: String,

    /// Product name frozen at time of sale.
    pub product_name: String,

    /// Units sold. Always positive.
    pub quantity: i64,

    /// Per-unit price frozen at time of sale.
    pub unit_price_cents: i64,
}

impl SaleItem {
    /// Returns the frozen unit price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns quantity × unit price.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale Filter
// =============================================================================

/// Date range filter for sales history. Both bounds are inclusive and
/// optional; the default filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_input() -> NewProduct {
        NewProduct {
            name: "Blue Pen".to_string(),
            sku: None,
            category: Some("Stationery".to_string()),
            price_cents: 250,
            quantity: 10,
            low_stock_threshold: None,
        }
    }

    #[test]
    fn test_product_new_applies_defaults() {
        let now = Utc::now();
        let product = Product::new(
            "550e8400-e29b-41d4-a716-446655440000".to_string(),
            "user-1",
            new_input(),
            now,
        );

        assert_eq!(product.sku, "550E8400");
        assert_eq!(product.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
        assert!(product.is_active);
        assert_eq!(product.created_at, now);
        assert_eq!(product.updated_at, now);
    }

    #[test]
    fn test_sku_or_derived() {
        let mut input = new_input();
        assert_eq!(input.sku_or_derived("abcdef1234"), "ABCDEF12");

        input.sku = Some("  COKE-330  ".to_string());
        assert_eq!(input.sku_or_derived("abcdef1234"), "COKE-330");

        input.sku = Some("   ".to_string());
        assert_eq!(input.sku_or_derived("abcdef1234"), "ABCDEF12");
    }

    #[test]
    fn test_is_low_stock_boundary() {
        let now = Utc::now();
        let mut product = Product::new("id-1".to_string(), "user-1", new_input(), now);

        product.quantity = 5;
        product.low_stock_threshold = 5;
        assert!(product.is_low_stock());

        product.quantity = 6;
        assert!(!product.is_low_stock());

        product.quantity = 0;
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProductPatch::default().is_empty());

        let patch = ProductPatch {
            price_cents: Some(300),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_sale_item_subtotal() {
        let item = SaleItem {
            id: "item-1".to_string(),
            sale_id: "sale-1".to_string(),
            product_id: "prod-1".to_string(),
            product_name: "Blue Pen".to_string(),
            quantity: 3,
            unit_price_cents: 250,
        };

        assert_eq!(item.unit_price(), Money::from_cents(250));
        assert_eq!(item.subtotal(), Money::from_cents(750));
    }
}
