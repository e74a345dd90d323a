//! # Error Types
//!
//! Domain-specific error types for quickcommerce-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quickcommerce-core errors (this file)                                 │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  quickcommerce-store errors (separate crate)                           │
//! │  └── StoreError       - Slot I/O, not-found lookups                    │
//! │                                                                         │
//! │  CLI errors (apps/cli)                                                 │
//! │  └── CliError         - What the shopper sees (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → CliError → Terminal  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Cart mutations themselves never fail; these come from checkout and from
/// the guards the presentation layer runs before touching the cart.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Not enough stock to satisfy the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Widget", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Widget in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: u32,
        requested: u64,
    },

    /// A variant axis of the product has no chosen value.
    #[error("{product} requires a {axis} selection")]
    MissingVariant { product: String, axis: String },

    /// The chosen value is not one of the axis' options.
    #[error("{product} has no {axis} option '{value}'")]
    InvalidVariantOption {
        product: String,
        axis: String,
        value: String,
    },

    /// The selection names an axis the product does not have.
    #[error("{product} has no variant axis '{axis}'")]
    UnknownVariantAxis { product: String, axis: String },

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

    /// Invalid format (e.g., malformed email, bad zip code).
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
