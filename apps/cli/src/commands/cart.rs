//! # Cart Commands
//!
//! Cart manipulation from the command line.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │   Form   │     │ (pending)│       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                  │             │
//! │                   cart add                                │             │
//! │                   cart set                         cart is cleared     │
//! │                   cart remove                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   cart clear ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation is written to the cart slot before the command returns,
//! so the next invocation sees it.

use quickcommerce_core::validation::validate_quantity;
use quickcommerce_core::{
    CartTotals, LineItem, OrderSummary, ProductId, QuantityChange, VariantSelection,
};
use serde::Serialize;
use tracing::debug;

use super::Output;
use crate::error::{CliError, CliResult};
use crate::state::{AppConfig, AppState};

/// Cart contents with totals and the checkout price breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
    pub summary: OrderSummary,
}

impl CartResponse {
    fn from_state(state: &AppState) -> Self {
        CartResponse {
            items: state.cart.items().to_vec(),
            totals: state.cart.totals(),
            summary: OrderSummary::for_cart(state.cart.cart()),
        }
    }

    fn into_output(self, config: &AppConfig, headline: Option<String>) -> CliResult<Output> {
        let mut text = render_cart(config, &self);
        if let Some(headline) = headline {
            text = format!("{headline}\n\n{text}");
        }
        Output::new(&self, text)
    }
}

/// Shows the cart.
pub fn show(state: &AppState) -> CliResult<Output> {
    debug!("cart show");
    CartResponse::from_state(state).into_output(&state.config, None)
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - Options not given on the command line start from the product's
///   default selection (first option on every axis)
/// - The full selection must name a listed option on every axis
/// - The quantity, plus what is already in the cart for that selection,
///   must be in stock
/// - Same product and selection already in the cart: quantities merge
pub async fn add(
    state: &mut AppState,
    product_id: &ProductId,
    quantity: i64,
    variants: Option<VariantSelection>,
) -> CliResult<Output> {
    debug!(product_id = %product_id, quantity, "cart add");
    validate_quantity(quantity)?;
    let quantity =
        u32::try_from(quantity).map_err(|_| CliError::validation("quantity is out of range"))?;

    let product = state.backend.catalog().fetch_by_id(product_id).await?;

    let mut selection = product.default_selection();
    if let Some(given) = variants {
        for (axis, option) in given.iter() {
            selection.insert(axis, option);
        }
    }
    product.validate_selection(&selection)?;

    let in_cart = state.cart.cart().quantity_of(&product.id, &selection);
    product.ensure_available(u64::from(in_cart) + u64::from(quantity))?;

    state.cart.add_item(&product, quantity, selection)?;
    CartResponse::from_state(state).into_output(&state.config, None)
}

/// Removes a line from the cart.
pub fn remove(
    state: &mut AppState,
    product_id: &ProductId,
    variants: Option<VariantSelection>,
) -> CliResult<Output> {
    debug!(product_id = %product_id, "cart remove");
    let selection = resolve_line(state, product_id, variants)?;
    let removed = state.cart.remove_item(product_id, &selection)?;

    let headline = (removed == 0).then(|| not_removed(state, product_id));
    CartResponse::from_state(state).into_output(&state.config, headline)
}

/// Sets a line's quantity. Zero or below removes the line.
pub fn set(
    state: &mut AppState,
    product_id: &ProductId,
    quantity: i64,
    variants: Option<VariantSelection>,
) -> CliResult<Output> {
    debug!(product_id = %product_id, quantity, "cart set");
    if quantity > 0 {
        validate_quantity(quantity)?;
    }
    let selection = resolve_line(state, product_id, variants)?;

    let headline = match state.cart.set_quantity(product_id, &selection, quantity)? {
        QuantityChange::NotInCart => Some(format!("Product {product_id} is not in the cart.")),
        QuantityChange::Removed { lines: 0 } => Some(not_removed(state, product_id)),
        _ => None,
    };
    CartResponse::from_state(state).into_output(&state.config, headline)
}

pub fn clear(state: &mut AppState) -> CliResult<Output> {
    debug!("cart clear");
    state.cart.clear()?;
    CartResponse::from_state(state).into_output(&state.config, None)
}

/// Headline for a removal that matched nothing. The store still raised its
/// "removed" toast, which would contradict it, so that toast is dropped.
fn not_removed(state: &AppState, product_id: &ProductId) -> String {
    state.take_notifications();
    format!("Product {product_id} was not in the cart.")
}

/// Picks the line a remove/set refers to.
///
/// With `--variant` given, that exact selection. Without it, the only line
/// for the product, or an empty selection when there is none. Several
/// lines for the product need an explicit `--variant`.
fn resolve_line(
    state: &AppState,
    product_id: &ProductId,
    variants: Option<VariantSelection>,
) -> CliResult<VariantSelection> {
    if let Some(selection) = variants {
        return Ok(selection);
    }

    let lines: Vec<&LineItem> = state
        .cart
        .items()
        .iter()
        .filter(|line| line.product_id == *product_id)
        .collect();

    match lines.as_slice() {
        [] => Ok(VariantSelection::new()),
        [line] => Ok(line.variants.clone()),
        many => Err(CliError::validation(format!(
            "Product {product_id} is in the cart with {} different selections; pass --variant (e.g. {})",
            many.len(),
            many[0].variants.canonical().replace(';', ",")
        ))),
    }
}

fn render_cart(config: &AppConfig, cart: &CartResponse) -> String {
    if cart.items.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut out = format!(
        "CART{:>62}\n",
        format!(
            "{} {}",
            cart.totals.total_quantity,
            if cart.totals.total_quantity == 1 { "item" } else { "items" }
        )
    );
    for line in &cart.items {
        let label = if line.variants.is_empty() {
            line.name.clone()
        } else {
            format!("{} ({})", line.name, line.variants.label())
        };
        out.push_str(&format!(
            "  {:>4}  {:<40} x{:<4} {:>10}\n",
            line.product_id,
            label,
            line.quantity,
            config.format_currency(line.line_total())
        ));
    }

    let summary = &cart.summary;
    out.push_str(&format!(
        "\n  {:<52}{:>12}\n",
        "Subtotal",
        config.format_currency(summary.subtotal)
    ));
    out.push_str(&format!(
        "  {:<52}{:>12}\n",
        "Shipping",
        if summary.has_free_shipping() {
            "FREE".to_string()
        } else {
            config.format_currency(summary.shipping)
        }
    ));
    out.push_str(&format!(
        "  {:<52}{:>12}\n",
        "Tax (8%)",
        config.format_currency(summary.tax)
    ));
    out.push_str(&format!(
        "  {:<52}{:>12}",
        "TOTAL",
        config.format_currency(summary.total)
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{state, state_over};
    use crate::error::ErrorCode;
    use quickcommerce_store::{MemoryStorage, Notification};

    fn id(n: u64) -> ProductId {
        ProductId::from(n)
    }

    fn size(s: &str) -> Option<VariantSelection> {
        Some(VariantSelection::new().with("Size", s))
    }

    #[tokio::test]
    async fn test_add_uses_default_selection_and_merges() {
        let mut state = state();

        add(&mut state, &id(1), 2, None).await.unwrap();
        add(&mut state, &id(1), 1, None).await.unwrap();

        assert_eq!(state.cart.line_count(), 1);
        let line = &state.cart.items()[0];
        assert_eq!(line.quantity, 3);
        assert_eq!(line.variants.get("Size"), Some("S"));
        assert_eq!(line.variants.get("Color"), Some("White"));

        assert_eq!(
            state.take_notifications(),
            vec![
                Notification::ItemAdded {
                    name: "Classic Cotton T-Shirt".to_string()
                },
                Notification::QuantityUpdated {
                    name: "Classic Cotton T-Shirt".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_add_distinct_variants_make_distinct_lines() {
        let mut state = state();
        add(&mut state, &id(1), 1, size("M")).await.unwrap();
        let output = add(&mut state, &id(1), 1, size("L")).await.unwrap();

        assert_eq!(state.cart.line_count(), 2);
        assert_eq!(output.json["totals"]["totalQuantity"], 2);
        assert_eq!(output.json["items"][1]["variants"]["Size"], "L");
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let mut state = state();

        let err = add(&mut state, &id(1), 0, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add(&mut state, &id(1), 1, size("XXL")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        // Running shoes are out of stock
        let err = add(&mut state, &id(5), 1, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        // Desk lamp: 5 in stock, 4 in cart already
        add(&mut state, &id(8), 4, None).await.unwrap();
        assert!(add(&mut state, &id(8), 2, None).await.is_err());

        let err = add(&mut state, &id(999), 1, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        assert_eq!(state.cart.total_item_count(), 4);
    }

    #[tokio::test]
    async fn test_set_and_remove_resolve_single_line() {
        let mut state = state();
        add(&mut state, &id(9), 1, size("M")).await.unwrap();

        let output = set(&mut state, &id(9), 4, None).unwrap();
        assert_eq!(output.json["items"][0]["quantity"], 4);

        let output = set(&mut state, &id(9), 0, None).unwrap();
        assert!(state.cart.is_empty());
        assert_eq!(output.text, "Your cart is empty.");

        let output = remove(&mut state, &id(9), None).unwrap();
        assert!(output.text.starts_with("Product 9 was not in the cart."));
    }

    #[tokio::test]
    async fn test_removing_missing_line_raises_no_toast() {
        let mut state = state();
        add(&mut state, &id(4), 1, None).await.unwrap();
        state.take_notifications();

        let output = remove(&mut state, &id(9), None).unwrap();
        assert!(output.text.starts_with("Product 9 was not in the cart."));
        assert!(state.take_notifications().is_empty());

        set(&mut state, &id(9), 0, size("M")).unwrap();
        assert!(state.take_notifications().is_empty());

        remove(&mut state, &id(4), None).unwrap();
        assert_eq!(state.take_notifications(), vec![Notification::ItemRemoved]);
    }

    #[tokio::test]
    async fn test_ambiguous_line_needs_variant() {
        let mut state = state();
        add(&mut state, &id(9), 1, size("M")).await.unwrap();
        add(&mut state, &id(9), 1, size("L")).await.unwrap();

        let err = remove(&mut state, &id(9), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("--variant"));

        remove(&mut state, &id(9), size("L")).unwrap();
        assert_eq!(state.cart.line_count(), 1);
    }

    #[tokio::test]
    async fn test_cart_persists_between_invocations() {
        let storage = MemoryStorage::new();
        {
            let mut first = state_over(storage.clone());
            add(&mut first, &id(4), 2, None).await.unwrap();
        }

        let mut second = state_over(storage);
        let output = show(&second).unwrap();
        assert_eq!(output.json["totals"]["totalQuantity"], 2);
        // 28.00 + 10.00 shipping + 2.24 tax
        assert_eq!(output.json["summary"]["total"], 40.24);

        clear(&mut second).unwrap();
        assert!(second.cart.is_empty());
    }

    #[test]
    fn test_show_empty_cart() {
        let state = state();
        let output = show(&state).unwrap();
        assert_eq!(output.text, "Your cart is empty.");
        assert_eq!(output.json["items"].as_array().unwrap().len(), 0);
    }
}
