//! # quickcommerce-core: Pure Business Logic for QuickCommerce
//!
//! This crate is the **heart** of the QuickCommerce storefront. It contains
//! the cart rules, checkout pricing and input validation as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      QuickCommerce Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (apps/cli)                         │   │
//! │  │    Shop ──► Product Detail ──► Cart ──► Checkout ──► Admin      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               quickcommerce-store                               │   │
//! │  │    CartStore (slot persistence), CatalogService, OrderService   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ quickcommerce-core (THIS CRATE) ★                 │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ checkout  │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ Summary   │  │   │
//! │  │   │   Order   │  │  (cents)  │  │ LineItem  │  │ NewOrder  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO LATENCY • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, ProductId, etc.)
//! - [`variant`] - Variant selections and the canonical line identity key
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart value: line items, merging, totals
//! - [`checkout`] - Checkout form, order pricing, order payload building
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use quickcommerce_core::{Cart, Money, Product, ProductId, VariantSelection};
//!
//! let widget = Product::new(ProductId::from(1), "Widget", Money::from_cents(999))
//!     .with_image("x.png")
//!     .with_stock(5);
//!
//! let mut cart = Cart::new();
//! cart.add_item(&widget, 2, VariantSelection::new());
//!
//! assert_eq!(cart.total_item_count(), 2);
//! assert_eq!(cart.total_price().cents(), 1998);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;
pub mod variant;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{AddOutcome, Cart, CartTotals, LineItem, QuantityChange};
pub use checkout::{CheckoutForm, OrderSummary};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
pub use variant::{LineKey, VariantSelection};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Namespace of the persisted cart slot.
pub const CART_STORAGE_NAMESPACE: &str = "quickcommerce";

/// Key of the persisted cart slot inside [`CART_STORAGE_NAMESPACE`].
pub const CART_STORAGE_KEY: &str = "cart";

/// Maximum quantity a shopper can request in a single add.
///
/// ## Business Reason
/// Prevents accidental over-ordering (typing 1000 instead of 10).
/// Only enforced at the input boundary; the cart itself merges freely.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Orders with a subtotal strictly above this ship for free ($100.00).
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(10_000);

/// Flat shipping fee below the free-shipping threshold ($10.00).
pub const FLAT_SHIPPING_FEE: Money = Money::from_cents(1_000);

/// Sales tax applied at checkout, in basis points (800 = 8%).
pub const SALES_TAX_BPS: u32 = 800;

/// Products at or below this stock level show as "Low Stock".
pub const LOW_STOCK_BADGE_LEVEL: u32 = 10;

/// Default threshold for the admin low-stock report.
pub const LOW_STOCK_REPORT_THRESHOLD: u32 = 20;
