//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Command Function  ──►  Result<T, ApiError>                             │
//! │         │                                                               │
//! │         ├── CoreError::BelowMoq { .. }     ──►  VALIDATION_ERROR        │
//! │         ├── CoreError::EmptyCart           ──►  CART_ERROR              │
//! │         ├── CoreError::ProductNotFound(id) ──►  NOT_FOUND               │
//! │         ├── DbError::QueryFailed(..)       ──►  DATABASE_ERROR          │
//! │         └── Success ─────────────────────────────────────────────────►  │
//! │                                                                         │
//! │  Caller receives: { "code": "VALIDATION_ERROR",                         │
//! │                     "message": "Minimum order for SILK-01 is 50, .." }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use loom_core::{CoreError, ValidationError};
use loom_db::DbError;

/// API error returned from storefront commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: ORD-1A2B3C4D5"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Storage operation failed (500)
    DatabaseError,

    /// Business rule refused the operation (422)
    BusinessLogic,

    /// Internal error (500)
    Internal,

    /// Cart operation failed
    CartError,

    /// Payment could not be recorded
    PaymentError,
}

/// Result type for storefront commands.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConstraintViolation { message } => {
                tracing::error!("Constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid data")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::InvalidData { column, reason } => {
                tracing::error!(column = %column, "Stored data is invalid: {}", reason);
                ApiError::new(ErrorCode::DatabaseError, "Stored data is invalid")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::WriteRejected(e) => {
                tracing::error!("Write rejected: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database write rejected")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::EmptyCart | CoreError::CartTooLarge { .. } => ApiError::cart(message),
            CoreError::BelowMoq { .. }
            | CoreError::VariantRequired { .. }
            | CoreError::FactoryMoqNotMet { .. } => ApiError::validation(message),
            CoreError::InvalidOrderStatus { .. } => ApiError::new(ErrorCode::BusinessLogic, message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
