//! # Error Types
//!
//! Domain-specific error types for loom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  loom-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations (MOQ, empty cart)     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  loom-db errors (separate crate)                                       │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  Storefront errors (in app)                                            │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, ID, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// The storefront translates them into `ApiError` values for the frontend.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the current catalog.
    ///
    /// ## When This Occurs
    /// - A cart line references a product that was removed from the catalog
    /// - A command was issued with a stale product id
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Checkout was attempted with an empty cart. No order is created.
    #[error("Cart is empty")]
    EmptyCart,

    /// Requested quantity is below the product's minimum order quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 20, MOQ: 50)
    ///      │
    ///      ▼
    /// BelowMoq { sku: "SILK-01", moq: 50, requested: 20 }
    ///      │
    ///      ▼
    /// UI shows: "Minimum order for SILK-01 is 50"
    /// ```
    #[error("Minimum order for {sku} is {moq}, requested {requested}")]
    BelowMoq {
        sku: String,
        moq: i64,
        requested: i64,
    },

    /// Product has variants but none (or an unknown one) was selected.
    #[error("Select a variant of {sku} before adding it to the cart")]
    VariantRequired { sku: String },

    /// The part of the line that would be backordered is below the factory MOQ.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 60, stock: 40, factory MOQ: 100)
    ///      │
    ///      ▼
    /// 20 would go to the factory, 20 < 100
    ///      │
    ///      ▼
    /// FactoryMoqNotMet { sku, factory_moq: 100, factory_qty: 20 }
    /// ```
    #[error("Factory minimum for {sku} is {factory_moq}, only {factory_qty} would be ordered from the factory")]
    FactoryMoqNotMet {
        sku: String,
        factory_moq: i64,
        factory_qty: i64,
    },

    /// Order is not in a state that allows the requested operation.
    #[error("Order {order_id} is {current_status}, cannot perform operation")]
    InvalidOrderStatus {
        order_id: String,
        current_status: String,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Invalid format (e.g., malformed amount, bad currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::BelowMoq {
            sku: "SILK-01".to_string(),
            moq: 50,
            requested: 20,
        };
        assert_eq!(
            err.to_string(),
            "Minimum order for SILK-01 is 50, requested 20"
        );

        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
