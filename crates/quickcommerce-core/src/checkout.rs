//! # Checkout
//!
//! Turns a cart plus the checkout form into an order payload.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (non-empty)        CheckoutForm                                   │
//! │        │                      │                                         │
//! │        │                      ▼                                         │
//! │        │               validate() ── contact + shipping fields          │
//! │        ▼                      │                                         │
//! │  OrderSummary::for_cart()     │                                         │
//! │    subtotal                   │                                         │
//! │    + shipping ($0 over $100, else $10)                                  │
//! │    + tax (8%)                 │                                         │
//! │        │                      │                                         │
//! │        └──────────┬───────────┘                                         │
//! │                   ▼                                                     │
//! │           build_order() → NewOrder ──► OrderService::submit            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Customer, NewOrder, ShippingAddress};
use crate::validation::{
    validate_email, validate_phone, validate_required, validate_zip_code, ValidationResult,
};
use crate::{FLAT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD, SALES_TAX_BPS};

// =============================================================================
// Order Summary
// =============================================================================

/// Price breakdown shown beside the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderSummary {
    #[ts(type = "number")]
    pub subtotal: Money,
    #[ts(type = "number")]
    pub shipping: Money,
    #[ts(type = "number")]
    pub tax: Money,
    #[ts(type = "number")]
    pub total: Money,
}

impl OrderSummary {
    /// Prices a subtotal.
    ///
    /// ## Example
    /// ```rust
    /// use quickcommerce_core::{Money, OrderSummary};
    ///
    /// let summary = OrderSummary::for_subtotal(Money::from_cents(2997));
    /// assert_eq!(summary.shipping.cents(), 1000); // under $100
    /// assert_eq!(summary.tax.cents(), 240);       // 8%, rounded
    /// assert_eq!(summary.total.cents(), 4237);
    /// ```
    pub fn for_subtotal(subtotal: Money) -> Self {
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Money::zero()
        } else {
            FLAT_SHIPPING_FEE
        };
        let tax = subtotal.apply_rate_bps(SALES_TAX_BPS);
        OrderSummary {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    pub fn for_cart(cart: &Cart) -> Self {
        Self::for_subtotal(cart.total_price())
    }

    pub fn has_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

// =============================================================================
// Checkout Form
// =============================================================================

/// Customer and shipping fields collected at checkout.
///
/// Card details are not part of this form: there is no payment processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Street address
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "USA".to_string()
}

impl Default for CheckoutForm {
    fn default() -> Self {
        CheckoutForm {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: default_country(),
        }
    }
}

impl CheckoutForm {
    /// Checks every field. Stops at the first problem, in form order.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("firstName", &self.first_name)?;
        validate_required("lastName", &self.last_name)?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        validate_required("address", &self.address)?;
        validate_required("city", &self.city)?;
        validate_required("state", &self.state)?;
        validate_required("country", &self.country)?;
        validate_zip_code(&self.zip_code, &self.country)?;
        Ok(())
    }

    pub fn customer(&self) -> Customer {
        Customer {
            name: format!("{} {}", self.first_name.trim(), self.last_name.trim()),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }

    pub fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            street: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            country: self.country.trim().to_string(),
        }
    }
}

/// Builds the order payload for `cart`.
///
/// ## Errors
/// - [`CoreError::EmptyCart`] when there is nothing to order
/// - [`CoreError::Validation`] when a form field is missing or malformed
pub fn build_order(cart: &Cart, form: &CheckoutForm) -> CoreResult<NewOrder> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    form.validate()?;

    Ok(NewOrder {
        items: cart.items().iter().map(|line| line.to_order_item()).collect(),
        customer: form.customer(),
        total: OrderSummary::for_cart(cart).total,
        shipping_address: form.shipping_address(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::{Product, ProductId};
    use crate::variant::VariantSelection;

    fn form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555-123-4567".to_string(),
            address: "1 Market St".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            zip_code: "94105".to_string(),
            ..CheckoutForm::default()
        }
    }

    fn cart_with(cents: i64, quantity: u32) -> Cart {
        let product = Product::new(ProductId::from(1), "Widget", Money::from_cents(cents));
        let mut cart = Cart::new();
        cart.add_item(&product, quantity, VariantSelection::new());
        cart
    }

    #[test]
    fn test_shipping_threshold_is_strict() {
        let at = OrderSummary::for_subtotal(Money::from_cents(10_000));
        assert_eq!(at.shipping.cents(), 1000);

        let over = OrderSummary::for_subtotal(Money::from_cents(10_001));
        assert!(over.has_free_shipping());
    }

    #[test]
    fn test_summary_totals() {
        let summary = OrderSummary::for_subtotal(Money::from_cents(12_500));
        assert_eq!(summary.tax.cents(), 1000);
        assert_eq!(summary.total.cents(), 13_500);
    }

    #[test]
    fn test_default_country_is_usa() {
        assert_eq!(CheckoutForm::default().country, "USA");
        let parsed: CheckoutForm = serde_json::from_str(
            r#"{"firstName":"A","lastName":"B","email":"a@b.co","phone":"5551234567",
                "address":"x","city":"y","state":"z","zipCode":"12345"}"#,
        )
        .unwrap();
        assert_eq!(parsed.country, "USA");
    }

    #[test]
    fn test_build_order() {
        let cart = cart_with(999, 3);
        let order = build_order(&cart, &form()).unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 3);
        assert_eq!(order.customer.name, "Ana Lopez");
        assert_eq!(order.shipping_address.zip_code, "94105");
        // 29.97 + 10.00 + 2.40
        assert_eq!(order.total.cents(), 4237);
    }

    #[test]
    fn test_build_order_rejects_empty_cart() {
        assert!(matches!(
            build_order(&Cart::new(), &form()),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_build_order_reports_first_invalid_field() {
        let mut bad = form();
        bad.email = "nope".to_string();
        bad.city = String::new();

        match build_order(&cart_with(100, 1), &bad) {
            Err(CoreError::Validation(ValidationError::InvalidFormat { field, .. })) => {
                assert_eq!(field, "email")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
