//! # Admin Commands
//!
//! Store management: dashboard, product CRUD, order fulfilment.
//!
//! ## Admin Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         quickcommerce admin                             │
//! │                                                                         │
//! │  dashboard ──► order stats + recent orders + low stock                  │
//! │                                                                         │
//! │  Products                          Orders                               │
//! │  ┌──────────────────────────┐      ┌──────────────────────────────┐    │
//! │  │ products                 │      │ orders [--status shipped]    │    │
//! │  │ low-stock [--threshold]  │      │ order ORD-001                │    │
//! │  │ create-product           │      │ order-status ORD-001 shipped │    │
//! │  │ update-product 3 --stock │      │ delete-order ORD-001         │    │
//! │  │ delete-product 3         │      └──────────────────────────────┘    │
//! │  └──────────────────────────┘                                          │
//! │                                                                         │
//! │  reset ──► seed catalog and orders again (the cart is left alone)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edits go through the backend services, so they are saved to the data
//! directory and visible to the shop commands on the next invocation.

use quickcommerce_core::{Order, OrderStatus, Product, ProductDraft, ProductId, ProductPatch};
use quickcommerce_store::DashboardStats;
use serde::Serialize;
use tracing::{debug, info};

use super::{order_table, product_table, Output};
use crate::error::{CliError, CliResult};
use crate::state::{AppConfig, AppState};

/// Number of orders shown on the dashboard.
const DASHBOARD_RECENT_ORDERS: usize = 5;

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_orders: Vec<Order>,
    pub low_stock: Vec<Product>,
}

pub async fn dashboard(state: &AppState) -> CliResult<Output> {
    let backend = &state.backend;
    let (stats, recent_orders, low_stock) = tokio::join!(
        backend.dashboard(),
        backend.orders().recent(Some(DASHBOARD_RECENT_ORDERS)),
        backend.catalog().low_stock(None),
    );

    let dashboard = Dashboard {
        stats: stats?,
        recent_orders: recent_orders?,
        low_stock: low_stock?,
    };
    let text = render_dashboard(&state.config, &dashboard);
    Output::new(&dashboard, text)
}

fn render_dashboard(config: &AppConfig, dashboard: &Dashboard) -> String {
    let stats = &dashboard.stats;
    let orders = &stats.orders;

    let mut out = format!("{} Dashboard\n\n", config.store_name);
    out.push_str(&format!(
        "  Revenue       {}\n  Orders        {} ({} pending, {} processing, {} shipped, {} delivered)\n",
        config.format_currency(orders.total_revenue),
        orders.total,
        orders.pending,
        orders.processing,
        orders.shipped,
        orders.delivered
    ));
    out.push_str(&format!(
        "  Products      {}\n  Low stock     {}\n",
        stats.product_count, stats.low_stock_count
    ));

    out.push_str("\nRecent orders\n");
    out.push_str(&order_table(config, &dashboard.recent_orders));

    out.push_str("\n\nLow stock\n");
    if dashboard.low_stock.is_empty() {
        out.push_str("Everything is well stocked.");
    } else {
        for p in &dashboard.low_stock {
            out.push_str(&format!("  {:>4}  {:<28} {:>4} left\n", p.id, p.name, p.stock));
        }
    }
    out.trim_end().to_string()
}

// =============================================================================
// Products
// =============================================================================

/// Every product, sorted by name.
pub async fn products(state: &AppState) -> CliResult<Output> {
    let mut products = state.backend.catalog().fetch_all().await?;
    products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    let text = product_table(&state.config, &products);
    Output::new(&products, text)
}

/// Products at or below `threshold` units (default 20).
pub async fn low_stock(state: &AppState, threshold: Option<u32>) -> CliResult<Output> {
    let products = state.backend.catalog().low_stock(threshold).await?;
    let text = product_table(&state.config, &products);
    Output::new(&products, text)
}

pub async fn create_product(state: &AppState, draft: ProductDraft) -> CliResult<Output> {
    debug!(name = %draft.name, "admin create-product");
    let product = state.backend.catalog().create(draft).await?;
    info!(product_id = %product.id, "Product created from CLI");

    let text = format!(
        "Created product {} ({}) at {}",
        product.id,
        product.name,
        state.config.format_currency(product.price)
    );
    Output::new(&product, text)
}

/// Applies a partial update. At least one field must be given.
pub async fn update_product(
    state: &AppState,
    id: &ProductId,
    patch: ProductPatch,
) -> CliResult<Output> {
    if patch.is_empty() {
        return Err(CliError::validation(
            "Nothing to update: pass at least one field (e.g. --price or --stock)",
        ));
    }

    let product = state.backend.catalog().update(id, patch).await?;
    let text = format!(
        "Updated product {} ({}): {}, {} in stock",
        product.id,
        product.name,
        state.config.format_currency(product.price),
        product.stock
    );
    Output::new(&product, text)
}

pub async fn delete_product(state: &AppState, id: &ProductId) -> CliResult<Output> {
    state.backend.catalog().delete(id).await?;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Deleted<'a> {
        deleted: &'a ProductId,
    }
    Output::new(&Deleted { deleted: id }, format!("Deleted product {id}"))
}

// =============================================================================
// Orders
// =============================================================================

/// Orders, newest first, optionally only those with `status`.
pub async fn orders(state: &AppState, status: Option<OrderStatus>) -> CliResult<Output> {
    let service = state.backend.orders();
    let orders = match status {
        Some(status) => service.list_by_status(status).await?,
        None => service.list_all().await?,
    };
    let text = order_table(&state.config, &orders);
    Output::new(&orders, text)
}

pub async fn order(state: &AppState, id: &str) -> CliResult<Output> {
    let order = state.backend.orders().get_by_id(id).await?;
    let text = render_order(&state.config, &order);
    Output::new(&order, text)
}

pub async fn order_status(state: &AppState, id: &str, status: OrderStatus) -> CliResult<Output> {
    let order = state.backend.orders().update_status(id, status).await?;
    let text = format!("Order {} is now {}", order.id, order.status);
    Output::new(&order, text)
}

pub async fn delete_order(state: &AppState, id: &str) -> CliResult<Output> {
    state.backend.orders().delete(id).await?;

    #[derive(Serialize)]
    struct Deleted<'a> {
        deleted: &'a str,
    }
    Output::new(&Deleted { deleted: id }, format!("Deleted order {id}"))
}

fn render_order(config: &AppConfig, order: &Order) -> String {
    let mut out = format!(
        "Order {}  [{}]\nPlaced {}\n\nCustomer: {} <{}> {}\n",
        order.id,
        order.status,
        order.created_at.format("%Y-%m-%d %H:%M UTC"),
        order.customer.name,
        order.customer.email,
        order.customer.phone
    );
    let address = &order.shipping_address;
    out.push_str(&format!(
        "Ship to:  {}, {}, {} {}, {}\n\n",
        address.street, address.city, address.state, address.zip_code, address.country
    ));

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
            config.format_currency(item.price)
        ));
    }
    out.push_str(&format!(
        "\n  {} units, total {}",
        order.unit_count(),
        config.format_currency(order.total)
    ));
    out
}

// =============================================================================
// Reset
// =============================================================================

/// Reseeds catalog and orders. The cart is not touched.
pub async fn reset(state: &AppState) -> CliResult<Output> {
    state.backend.reset().await?;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Reset {
        products: usize,
        orders: usize,
    }
    let summary = Reset {
        products: state.backend.catalog().fetch_all().await?.len(),
        orders: state.backend.orders().list_all().await?.len(),
    };
    let text = format!(
        "Reset store data: {} products, {} orders",
        summary.products, summary.orders
    );
    Output::new(&summary, text)
}
