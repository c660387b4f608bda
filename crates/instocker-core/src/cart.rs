//! # Cart
//!
//! An in-memory cart that accumulates lines before checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Operations                                  │
//! │                                                                         │
//! │  Caller Action            Cart Method             Cart Change           │
//! │  ─────────────            ───────────             ───────────           │
//! │                                                                         │
//! │  Pick product ───────────► add_line() ──────────► lines.push(line)     │
//! │                               │                    (or merge quantity)  │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ───► lines[i].qty = n     │
//! │                               │                    (qty <= 0 removes)   │
//! │                                                                         │
//! │  Remove line ────────────► remove_line() ───────► lines.retain(..)     │
//! │                                                                         │
//! │  Start over ─────────────► clear() ─────────────► lines.clear()        │
//! │                                                                         │
//! │  Checkout ───────────────► Checkout::record_sale(&cart, ..)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Freezing
//! Each line snapshots the product name and unit price at the moment it is
//! added. A price change in the catalog never touches a cart that already
//! holds the product, and the recorded sale uses the cart's price.
//!
//! ## Thread Safety
//! `Cart` is a plain value. Callers that share one across tasks wrap it
//! themselves (the app layer owns that concern, not this crate).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_line_quantity, ValidationResult};
use crate::MAX_CART_LINES;

// =============================================================================
// Cart Line
// =============================================================================

/// One line in the cart.
///
/// ## Design Notes
/// - `product_id`: Reference to the catalog row (for checkout lookup)
/// - `product_name` / `unit_price_cents`: Frozen copies taken at add time,
///   so the cart displays consistent data even if the catalog changes
///   underneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub product_name: String,

    /// Quantity in cart
    pub quantity: i64,

    /// Price in cents at time of adding (frozen)
    pub unit_price_cents: i64,
}

impl CartLine {
    /// Creates a cart line from raw parts.
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price_cents: i64,
    ) -> Self {
        CartLine {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price_cents,
        }
    }

    /// Creates a cart line from a catalog product, freezing its name and
    /// price at this moment.
    pub fn for_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            unit_price_cents: product.price_cents,
        }
    }

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
// Cart
// =============================================================================

/// The cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product merges
///   quantities and keeps the FIRST price snapshot)
/// - Line quantity is always in 1..=MAX_LINE_QUANTITY
/// - At most MAX_CART_LINES lines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Lines in the cart
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a line to the cart, merging with an existing line for the same
    /// product.
    ///
    /// ## Behavior
    /// - Product already in cart: quantities are summed, the existing
    ///   price snapshot wins
    /// - Product not in cart: the line is appended
    ///
    /// ## Errors
    /// - Quantity (or merged quantity) outside 1..=MAX_LINE_QUANTITY
    /// - Cart already holds MAX_CART_LINES distinct lines
    pub fn add_line(&mut self, line: CartLine) -> ValidationResult<()> {
        validate_line_quantity(line.quantity)?;

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            let new_qty = existing.quantity + line.quantity;
            validate_line_quantity(new_qty)?;
            existing.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(ValidationError::OutOfRange {
                field: "cart lines".to_string(),
                min: 0,
                max: MAX_CART_LINES as i64,
            });
        }

        self.lines.push(line);
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - Quantity <= 0: the line is removed
    /// - Product not in cart: nothing happens
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> ValidationResult<()> {
        if quantity <= 0 {
            self.remove_line(product_id);
            return Ok(());
        }

        validate_line_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }

        Ok(())
    }

    /// Removes a line by product ID. Removing a product that is not in the
    /// cart does nothing.
    pub fn remove_line(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the number of distinct lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Calculates the grand total (sum of line subtotals).
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewProduct;
    use chrono::Utc;

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product::new(
            id.to_string(),
            "user-1",
            NewProduct {
                name: format!("Product {}", id),
                sku: Some(format!("SKU-{}", id)),
                category: None,
                price_cents,
                quantity: 100,
                low_stock_threshold: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_cart_add_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 999); // $9.99

        cart.add_line(CartLine::for_product(&product, 2)).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.total(), Money::from_cents(1998)); // $19.98
    }

    #[test]
    fn test_cart_add_same_product_merges_quantity() {
        let mut cart = Cart::new();
        let product = test_product("1", 999);

        cart.add_line(CartLine::for_product(&product, 2)).unwrap();
        cart.add_line(CartLine::for_product(&product, 3)).unwrap();

        assert_eq!(cart.line_count(), 1); // Still one distinct line
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_cart_merge_keeps_first_price() {
        let mut cart = Cart::new();

        cart.add_line(CartLine::new("p1", "Pen", 1, 250)).unwrap();
        // Same product added again after a price change
        cart.add_line(CartLine::new("p1", "Pen", 1, 300)).unwrap();

        assert_eq!(cart.lines[0].unit_price_cents, 250);
        assert_eq!(cart.total(), Money::from_cents(500));
    }

    #[test]
    fn test_cart_merge_respects_quantity_cap() {
        let mut cart = Cart::new();

        cart.add_line(CartLine::new("p1", "Pen", 500, 250)).unwrap();
        assert!(cart.add_line(CartLine::new("p1", "Pen", 500, 250)).is_err());

        // Failed merge leaves the original line untouched
        assert_eq!(cart.lines[0].quantity, 500);
    }

    #[test]
    fn test_cart_line_cap() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_LINES {
            cart.add_line(CartLine::new(format!("p{}", i), "Item", 1, 100))
                .unwrap();
        }

        assert!(cart.add_line(CartLine::new("overflow", "Item", 1, 100)).is_err());
        assert_eq!(cart.line_count(), MAX_CART_LINES);
    }

    #[test]
    fn test_cart_update_quantity() {
        let mut cart = Cart::new();
        cart.add_line(CartLine::new("p1", "Pen", 2, 250)).unwrap();

        cart.update_quantity("p1", 7).unwrap();
        assert_eq!(cart.lines[0].quantity, 7);

        // Zero or negative quantity removes the line
        cart.update_quantity("p1", 0).unwrap();
        assert!(cart.is_empty());

        // Unknown product is a no-op
        cart.update_quantity("ghost", 3).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_update_quantity_validates_cap() {
        let mut cart = Cart::new();
        cart.add_line(CartLine::new("p1", "Pen", 2, 250)).unwrap();

        assert!(cart.update_quantity("p1", 1000).is_err());
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[test]
    fn test_cart_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_line(CartLine::new("p1", "Pen", 2, 250)).unwrap();
        cart.add_line(CartLine::new("p2", "Pad", 1, 500)).unwrap();

        cart.remove_line("p1");
        assert_eq!(cart.line_count(), 1);

        // Removing an absent product does nothing
        cart.remove_line("p1");
        assert_eq!(cart.line_count(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }
}
