//! # CLI Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in QuickCommerce                          │
//! │                                                                         │
//! │  $ quickcommerce cart add 42                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  CliResult<Output>                                               │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ─── StoreError::NotFound { .. } ─────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Domain Error? ─── CoreError::MissingVariant ──── CliError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: error [NOT_FOUND]: Product not found: 42                      │
//! │          hint: run `quickcommerce products list` to see what exists    │
//! │  exit code 1                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With `--json` the same error is printed as
//! `{"code":"NOT_FOUND","message":"Product not found: 42"}`.

use quickcommerce_core::{CoreError, ValidationError};
use quickcommerce_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Error returned from CLI commands.
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{}] {message}", .code.as_str())]
pub struct CliError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for CLI failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product or order does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Reading or writing the data directory failed
    StorageError,

    /// Domain rule violated (empty cart, bad variant, no stock)
    BusinessLogic,

    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::BusinessLogic => "BUSINESS_LOGIC",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }

    /// A follow-up suggestion printed under the error, if there is one.
    pub fn hint(&self) -> Option<&'static str> {
        match self.code {
            ErrorCode::NotFound if self.message.starts_with("Order") => {
                Some("run `quickcommerce admin orders` to see existing orders")
            }
            ErrorCode::NotFound => {
                Some("run `quickcommerce products list` to see what exists, then try again")
            }
            ErrorCode::StorageError => {
                Some("check that the data directory is writable (QUICKCOMMERCE_DATA_DIR)")
            }
            _ => None,
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            other => CliError::new(ErrorCode::BusinessLogic, other.to_string()),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => CliError::new(ErrorCode::NotFound, err.to_string()),
            StoreError::Persistence { .. } => {
                tracing::error!(error = %err, "Storage failure");
                CliError::new(ErrorCode::StorageError, err.to_string())
            }
            StoreError::Serialization(e) => {
                tracing::error!(error = %e, "Serialization failure");
                CliError::internal("Could not encode or decode stored data")
            }
            StoreError::Validation(e) => e.into(),
            StoreError::Core(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("Could not encode output: {err}"))
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_with_hint() {
        let err: CliError = StoreError::not_found("Product", 42).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: 42");
        assert!(err.hint().is_some_and(|h| h.contains("products list")));

        let err: CliError = StoreError::not_found("Order", "ORD-999").into();
        assert!(err.hint().is_some_and(|h| h.contains("admin orders")));
    }

    #[test]
    fn test_core_errors_map_to_business_logic() {
        let err: CliError = StoreError::Core(CoreError::EmptyCart).into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(err.hint().is_none());

        let nested: CliError = CoreError::Validation(ValidationError::Required {
            field: "email".to_string(),
        })
        .into();
        assert_eq!(nested.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_json_shape() {
        let err = CliError::validation("bad zip");
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"code":"VALIDATION_ERROR","message":"bad zip"}"#
        );
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] bad zip");
    }
}
