//! # Commands Module
//!
//! One function per CLI subcommand. Each takes the [`AppState`] plus its
//! parsed arguments and returns an [`Output`]: the same result as text
//! for a terminal and as JSON for scripts.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (Output, shared rendering)
//! ├── product.rs   ◄─── products list / show / search / categories
//! ├── cart.rs      ◄─── cart show / add / remove / set / clear
//! ├── checkout.rs  ◄─── checkout
//! └── admin.rs     ◄─── admin dashboard, product and order management
//! ```
//!
//! [`AppState`]: crate::state::AppState

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod product;

use quickcommerce_core::{Money, Order, Product, ValidationError, VariantAxis};
use serde::Serialize;

use crate::error::CliResult;
use crate::state::AppConfig;

/// Result of a command, rendered two ways.
#[derive(Debug, Clone)]
pub struct Output {
    pub text: String,
    pub json: serde_json::Value,
}

impl Output {
    pub fn new(data: &impl Serialize, text: impl Into<String>) -> CliResult<Self> {
        Ok(Output {
            text: text.into(),
            json: serde_json::to_value(data)?,
        })
    }

    /// Prints the text or pretty JSON form to stdout.
    pub fn print(&self, json: bool) -> CliResult<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(&self.json)?);
        } else {
            println!("{}", self.text);
        }
        Ok(())
    }
}

/// One product per line: id, name, price, stock badge.
pub(crate) fn product_table(config: &AppConfig, products: &[Product]) -> String {
    if products.is_empty() {
        return "No products found.".to_string();
    }

    let mut out = format!(
        "{:>4}  {:<28} {:>10}  {:<14} {}\n",
        "ID", "NAME", "PRICE", "STOCK", "CATEGORY"
    );
    for p in products {
        out.push_str(&format!(
            "{:>4}  {:<28} {:>10}  {:<14} {}\n",
            p.id,
            truncate(&p.name, 28),
            config.format_currency(p.price),
            format!("{} ({})", p.stock_status().label(), p.stock),
            p.category
        ));
    }
    out.push_str(&format!(
        "\nShowing {} {}",
        products.len(),
        if products.len() == 1 { "product" } else { "products" }
    ));
    out
}

/// One order per line: id, customer, status, total, date.
pub(crate) fn order_table(config: &AppConfig, orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders found.".to_string();
    }

    let mut out = format!(
        "{:<8}  {:<20} {:<11} {:>10}  {}\n",
        "ORDER", "CUSTOMER", "STATUS", "TOTAL", "PLACED"
    );
    for o in orders {
        out.push_str(&format!(
            "{:<8}  {:<20} {:<11} {:>10}  {}\n",
            o.id,
            truncate(&o.customer.name, 20),
            o.status,
            config.format_currency(o.total),
            o.created_at.format("%Y-%m-%d %H:%M")
        ));
    }
    out.trim_end().to_string()
}

/// Parses a price argument such as `24.99` or `$24.99`.
pub fn parse_money(raw: &str) -> Result<Money, ValidationError> {
    let trimmed = raw.trim().trim_start_matches('$');
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Money::from_decimal)
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: format!("'{raw}' is not an amount"),
        })
}

/// Parses `--variant-axis Size=S|M|L`.
pub fn parse_variant_axis(raw: &str) -> Result<VariantAxis, ValidationError> {
    let invalid = || ValidationError::InvalidFormat {
        field: "variants".to_string(),
        reason: format!("expected Name=Option|Option, got '{raw}'"),
    };

    let (name, options) = raw.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    let options: Vec<String> = options
        .split('|')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if name.is_empty() || options.is_empty() {
        return Err(invalid());
    }
    Ok(VariantAxis {
        name: name.to_string(),
        options,
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use quickcommerce_store::MemoryStorage;

    use crate::state::{AppConfig, AppState};

    /// State over a fresh in-memory storage with latency off.
    pub fn state() -> AppState {
        state_over(MemoryStorage::new())
    }

    /// State over `storage`, so two calls can share data.
    pub fn state_over(storage: MemoryStorage) -> AppState {
        let config = AppConfig {
            simulate_latency: false,
            ..AppConfig::default()
        };
        AppState::with_storage(config, Arc::new(storage)).unwrap()
    }
}
