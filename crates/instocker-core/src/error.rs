//! # Error Types
//!
//! Domain-specific error types for Instocker.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  instocker-core errors (this file)                                     │
//! │  ├── StoreError       - Storage and business rule failures             │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  Every backend (SQLite, in-memory) returns the SAME error type, so    │
//! │  callers match on variants without caring which backend ran.          │
//! │                                                                         │
//! │  Flow: ValidationError → StoreError → caller → user-facing message    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (name, ID, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Storage and business rule errors.
///
/// These cover both domain failures (a sale that cannot be completed) and
/// infrastructure failures (a connection that cannot be opened). Backends
/// translate their native errors into these variants.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity cannot be found.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist
    /// - Cart references a product that was soft-deleted before checkout
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// SKU already in use by another product of the same user.
    ///
    /// ## When This Occurs
    /// - Creating a product with a SKU that user already has
    /// - The (user_id, sku) pair is unique, including soft-deleted rows
    #[error("SKU '{sku}' already exists")]
    DuplicateSku { sku: String },

    /// Insufficient stock to complete a sale or adjustment.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Coke 330ml", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Coke 330ml in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Checkout was attempted with no cart lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Pool closed or exhausted
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Backend storage failure (query error, I/O error, constraint we did
    /// not anticipate).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an InsufficientStock error.
    pub fn insufficient_stock(name: impl Into<String>, available: i64, requested: i64) -> Self {
        StoreError::InsufficientStock {
            name: name.into(),
            available,
            requested,
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::PoolTimedOut   → StoreError::ConnectionFailed
/// sqlx::Error::Database       → StoreError::Storage
/// Other                       → StoreError::Storage
/// ```
///
/// Unique violations are NOT mapped here: only the call site knows which
/// SKU collided, so it matches `is_unique_violation()` itself and builds
/// `DuplicateSku` with the actual value.
#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::PoolTimedOut => {
                StoreError::ConnectionFailed("Pool timed out".to_string())
            }

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Database(db_err) => StoreError::Storage(db_err.message().to_string()),

            _ => StoreError::Storage(err.to_string()),
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., SKU with forbidden characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::insufficient_stock("Coke 330ml", 3, 5);
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Coke 330ml: available 3, requested 5"
        );

        let err = StoreError::not_found("Product", "prod-42");
        assert_eq!(err.to_string(), "Product not found: prod-42");

        let err = StoreError::DuplicateSku {
            sku: "COKE-330".to_string(),
        };
        assert_eq!(err.to_string(), "SKU 'COKE-330' already exists");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");
    }

    #[test]
    fn test_validation_converts_to_store_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let store_err: StoreError = validation_err.into();
        assert!(matches!(store_err, StoreError::Validation(_)));
    }
}
