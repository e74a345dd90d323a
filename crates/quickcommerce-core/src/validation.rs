//! # Validation Module
//!
//! Input validation utilities for QuickCommerce.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (CLI args / form fields)                        │
//! │  ├── Type validation (clap / serde parsing)                            │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: Business rule validation                        │
//! │  ├── Checkout form (contact + shipping fields)                         │
//! │  └── Admin product drafts and patches                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Services (not-found lookups, stock floors)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quickcommerce_core::validation::{validate_email, validate_quantity};
//!
//! validate_email("ana@example.com").unwrap();
//! validate_quantity(5).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::VariantAxis;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required("name", name)?;
    validate_max_len("name", name, 200)
}

/// Validates a category name (required, at most 50 characters).
pub fn validate_category(category: &str) -> ValidationResult<()> {
    validate_required("category", category)?;
    validate_max_len("category", category, 50)
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    validate_max_len("query", query, 100)?;
    Ok(query.trim().to_string())
}

/// Validates an email address.
///
/// Deliberately loose: one `@`, a non-empty local part, and a domain with
/// a dot that neither starts nor ends the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    validate_required("email", email)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing '@'"))?;

    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid("not an email address"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must look like example.com"));
    }

    Ok(())
}

/// Validates a phone number: 7 to 15 digits, with common punctuation
/// (`+ - ( ) .` and spaces) allowed around them.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    validate_required("phone", phone)?;

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' '))
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "may only contain digits, spaces and + - ( ) .".to_string(),
        });
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain 7 to 15 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a postal code.
///
/// USA codes must be `12345` or `12345-6789`; other countries only need a
/// non-empty value of at most 12 characters.
pub fn validate_zip_code(zip: &str, country: &str) -> ValidationResult<()> {
    validate_required("zipCode", zip)?;
    let zip = zip.trim();

    if is_usa(country) {
        let valid = match zip.split_once('-') {
            None => zip.len() == 5 && zip.chars().all(|c| c.is_ascii_digit()),
            Some((base, ext)) => {
                base.len() == 5
                    && ext.len() == 4
                    && base.chars().chain(ext.chars()).all(|c| c.is_ascii_digit())
            }
        };
        if !valid {
            return Err(ValidationError::InvalidFormat {
                field: "zipCode".to_string(),
                reason: "must be 12345 or 12345-6789".to_string(),
            });
        }
        return Ok(());
    }

    validate_max_len("zipCode", zip, 12)
}

fn is_usa(country: &str) -> bool {
    matches!(
        country.trim().to_ascii_uppercase().as_str(),
        "USA" | "US" | "UNITED STATES"
    )
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product Detail: Add to Cart                                            │
/// │                                                                         │
/// │  Shopper enters quantity: 5                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → CartStore::add_item                                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items), negative is not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Every axis needs a name, at least one option, and a name no other axis
/// uses.
pub fn validate_variant_axes(axes: &[VariantAxis]) -> ValidationResult<()> {
    for (i, axis) in axes.iter().enumerate() {
        validate_required("variant name", &axis.name)?;

        if axis.options.is_empty() || axis.options.iter().any(|o| o.trim().is_empty()) {
            return Err(ValidationError::InvalidFormat {
                field: format!("variant {}", axis.name),
                reason: "needs at least one non-empty option".to_string(),
            });
        }

        if axes[..i].iter().any(|other| other.name == axis.name) {
            return Err(ValidationError::InvalidFormat {
                field: format!("variant {}", axis.name),
                reason: "appears more than once".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Wireless Headphones").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email(" ana.b@shop.co.uk ").is_ok());

        assert!(matches!(
            validate_email(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_email("ana.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@example").is_err());
        assert!(validate_email("ana@.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("(555) 123-4567").is_ok());
        assert!(validate_phone("+44 20 7946 0958").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("555-CALL-NOW").is_err());
    }

    #[test]
    fn test_validate_zip_code() {
        assert!(validate_zip_code("94107", "USA").is_ok());
        assert!(validate_zip_code("94107-1234", "us").is_ok());
        assert!(validate_zip_code("9410", "USA").is_err());
        assert!(validate_zip_code("ABCDE", "USA").is_err());
        assert!(validate_zip_code("SW1A 1AA", "UK").is_ok());
        assert!(validate_zip_code("", "UK").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(1099)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_variant_axes() {
        let size = VariantAxis {
            name: "Size".to_string(),
            options: vec!["S".to_string(), "M".to_string()],
        };
        assert!(validate_variant_axes(&[size.clone()]).is_ok());
        assert!(validate_variant_axes(&[size.clone(), size.clone()]).is_err());

        let empty = VariantAxis {
            name: "Color".to_string(),
            options: vec![],
        };
        assert!(validate_variant_axes(&[empty]).is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  lamp ").unwrap(), "lamp");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }
}
