//! # Store Error Types
//!
//! Error types for slot persistence and the simulated services.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  std::io::Error ──────────┐                                             │
//! │  serde_json::Error ───────┼──► StoreError ──► CliError ──► Terminal     │
//! │  ValidationError ─────────┤                                             │
//! │  CoreError ───────────────┘                                             │
//! │                                                                         │
//! │  Lookup misses in CatalogService / OrderService → StoreError::NotFound  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A corrupt cart slot is NOT an error: `CartStore` logs it and starts from
//! an empty cart.

use quickcommerce_core::{CoreError, ValidationError};
use thiserror::Error;

/// Store and service errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - Product id doesn't exist in the catalog
    /// - Order id doesn't exist
    /// - Product was deleted by an admin after the shopper loaded it
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Reading or writing a storage slot failed.
    ///
    /// ## When This Occurs
    /// - Data directory is not writable
    /// - Disk full
    /// - Slot file removed mid-rename
    #[error("Storage slot {slot} failed: {source}")]
    Persistence {
        slot: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be turned into or out of JSON.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input to an admin or checkout operation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Domain rule violation (empty cart at checkout, bad variant, ...).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn persistence(slot: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Persistence {
            slot: slot.into(),
            source,
        }
    }

    /// True for lookups the shopper can retry after refreshing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StoreError::not_found("Product", 42);
        assert_eq!(err.to_string(), "Product not found: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: StoreError = CoreError::EmptyCart.into();
        assert_eq!(err.to_string(), "Cart is empty");
        assert!(!err.is_not_found());
    }
}
