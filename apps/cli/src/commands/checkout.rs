//! # Checkout Command
//!
//! Turns the cart into a pending order.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout Flow                                   │
//! │                                                                         │
//! │  cart (file slot)  +  --first-name ... --zip ...                        │
//! │         │                       │                                       │
//! │         └───────────┬───────────┘                                       │
//! │                     ▼                                                   │
//! │         OrderSummary (subtotal, shipping, 8% tax)                       │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │         Backend::checkout ── empty cart / bad field ──► error, cart kept│
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │         order ORD-### (pending), stock decremented, cart cleared        │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │         receipt                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use quickcommerce_core::{CheckoutForm, Order, OrderSummary};
use serde::Serialize;
use tracing::info;

use super::Output;
use crate::error::CliResult;
use crate::state::{AppConfig, AppState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: Order,
    pub summary: OrderSummary,
}

/// Places the order for the current cart.
pub async fn checkout(state: &mut AppState, form: &CheckoutForm) -> CliResult<Output> {
    let summary = OrderSummary::for_cart(state.cart.cart());
    let order = state.backend.checkout(&mut state.cart, form).await?;
    info!(order_id = %order.id, "Order placed from CLI");

    let response = CheckoutResponse { order, summary };
    let text = render_receipt(&state.config, &response);
    Output::new(&response, text)
}

fn render_receipt(config: &AppConfig, receipt: &CheckoutResponse) -> String {
    let order = &receipt.order;
    let summary = &receipt.summary;

    let mut out = format!(
        "{}\nOrder {} placed. Thank you, {}!\n\n",
        config.store_name, order.id, order.customer.name
    );

    for item in &order.items {
        let label = if item.variant.is_empty() {
            item.product_name.clone()
        } else {
            format!("{} ({})", item.product_name, item.variant.label())
        };
        out.push_str(&format!(
            "  {:<44} x{:<4} {:>10}\n",
            label,
            item.quantity,
            config.format_currency(item.price.multiply_quantity(i64::from(item.quantity)))
        ));
    }

    out.push_str(&format!(
        "\n  {:<50}{:>10}\n  {:<50}{:>10}\n  {:<50}{:>10}\n  {:<50}{:>10}\n",
        "Subtotal",
        config.format_currency(summary.subtotal),
        "Shipping",
        if summary.has_free_shipping() {
            "FREE".to_string()
        } else {
            config.format_currency(summary.shipping)
        },
        "Tax",
        config.format_currency(summary.tax),
        "Total",
        config.format_currency(order.total),
    ));

    let address = &order.shipping_address;
    out.push_str(&format!(
        "\nShipping to {}, {}, {} {}, {}\nConfirmation sent to {}\nStatus: {}",
        address.street,
        address.city,
        address.state,
        address.zip_code,
        address.country,
        order.customer.email,
        order.status
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart;
    use crate::commands::test_support::state;
    use crate::error::ErrorCode;
    use quickcommerce_core::{OrderStatus, ProductId};

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

    #[tokio::test]
    async fn test_checkout_places_order_and_clears_cart() {
        let mut state = state();
        cart::add(&mut state, &ProductId::from(1), 2, None).await.unwrap();

        let output = checkout(&mut state, &form()).await.unwrap();

        assert_eq!(output.json["order"]["id"], "ORD-005");
        assert_eq!(output.json["order"]["status"], "pending");
        assert_eq!(output.json["order"]["total"], 63.98);
        assert_eq!(output.json["summary"]["tax"], 4.0);
        assert!(output.text.contains("Order ORD-005 placed. Thank you, Ana Lopez!"));
        assert!(state.cart.is_empty());

        let order = state.backend.orders().get_by_id("ORD-005").await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        let tee = state
            .backend
            .catalog()
            .fetch_by_id(&ProductId::from(1))
            .await
            .unwrap();
        assert_eq!(tee.stock, 43);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let mut state = state();
        let err = checkout(&mut state, &form()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(state.backend.orders().list_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_checkout_bad_form_keeps_cart() {
        let mut state = state();
        cart::add(&mut state, &ProductId::from(4), 1, None).await.unwrap();

        let bad = CheckoutForm {
            zip_code: "9410".to_string(),
            ..form()
        };
        let err = checkout(&mut state, &bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("zipCode"));
        assert_eq!(state.cart.total_item_count(), 1);
    }

    #[tokio::test]
    async fn test_receipt_free_shipping() {
        let mut state = state();
        cart::add(&mut state, &ProductId::from(2), 1, None).await.unwrap();

        let output = checkout(&mut state, &form()).await.unwrap();
        assert!(output.text.contains("FREE"));
        assert!(output.text.contains("Wireless Headphones (Color: Black)"));
        assert_eq!(output.json["summary"]["shipping"], 0.0);
    }
}
