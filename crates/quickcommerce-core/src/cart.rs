//! # Cart
//!
//! The shopping cart as a plain value: an ordered list of line items with
//! identity-based merging and derived totals. Persistence and notifications
//! live in `quickcommerce-store::CartStore`, which wraps this type.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Shopper Action           Cart Method              Effect              │
//! │  ──────────────           ───────────              ──────              │
//! │                                                                         │
//! │  Add to Cart ────────────► add_item() ───────────► merge or push       │
//! │                                                                         │
//! │  Change Quantity ────────► set_quantity() ───────► items[i].qty = n    │
//! │                             (n <= 0) ────────────► remove_item()       │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ────────► retain(!matches)    │
//! │                                                                         │
//! │  Click Clear ────────────► clear() ──────────────► items.clear()       │
//! │                                                                         │
//! │  Header Badge ───────────► total_item_count() ───► (read only)         │
//! │  Cart Summary ───────────► total_price() ────────► (read only)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - No two lines share a [`LineKey`] (same product + same selection merge)
//! - Every line has quantity > 0
//! - Insertion order is display order

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{OrderItem, Product, ProductId};
use crate::variant::{LineKey, VariantSelection};

// =============================================================================
// Line Item
// =============================================================================

/// One entry in the cart.
///
/// ## Snapshot Fields
/// `name`, `unit_price` and `image` are copied from the product when the
/// line is created and are not refreshed afterwards. A later catalog price
/// change does not reach lines already in the cart.
///
/// ## Persisted Layout
/// ```json
/// { "productId": 1, "name": "Widget", "price": 9.99,
///   "image": "x.png", "quantity": 2, "variants": { "Size": "M" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    #[ts(type = "number | string")]
    pub product_id: ProductId,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Unit price at time of adding (frozen)
    #[serde(rename = "price")]
    #[ts(type = "number")]
    pub unit_price: Money,

    /// Primary image at time of adding; empty when the product had none
    #[serde(default)]
    pub image: String,

    /// Always > 0 for a line held by a [`Cart`]. A saved negative count
    /// reads as 0 so [`Cart::from_items`] drops just that line.
    #[serde(deserialize_with = "quantity_from_wire")]
    pub quantity: u32,

    #[serde(default)]
    pub variants: VariantSelection,
}

impl LineItem {
    /// Snapshots `product` into a new line.
    pub fn from_product(product: &Product, quantity: u32, variants: VariantSelection) -> Self {
        LineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image: product.primary_image().unwrap_or_default().to_string(),
            quantity,
            variants,
        }
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(&self.product_id, &self.variants)
    }

    /// True if this line has the identity (`product_id`, `variants`),
    /// compared through the canonical [`LineKey`].
    pub fn matches(&self, product_id: &ProductId, variants: &VariantSelection) -> bool {
        self.product_id == *product_id && self.key() == LineKey::new(product_id, variants)
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(i64::from(self.quantity))
    }

    /// Freezes this line into an order line.
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            product_id: self.product_id.clone(),
            product_name: self.name.clone(),
            quantity: self.quantity,
            price: self.unit_price,
            variant: self.variants.clone(),
        }
    }
}

/// Reads a saved quantity as a signed integer and clamps it into `u32`.
fn quantity_from_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(u32::try_from(raw.max(0)).unwrap_or(u32::MAX))
}

// =============================================================================
// Outcomes
// =============================================================================

/// Which branch `add_item` took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended.
    Added,
    /// An existing line absorbed the quantity; `quantity` is its new value.
    Merged { quantity: u32 },
    /// Quantity zero; nothing changed.
    Ignored,
}

/// What `set_quantity` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The matching line now has the requested quantity.
    Updated,
    /// Quantity was <= 0, so matching lines were removed (possibly none).
    Removed { lines: usize },
    /// No line has that identity.
    NotInCart,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// Serializes as a bare JSON array of [`LineItem`], which is exactly the
/// persisted slot layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from raw lines, restoring the invariants.
    ///
    /// Lines with quantity 0 (saved negatives read as 0) are dropped; lines
    /// sharing an identity are merged into the first occurrence. Order of
    /// first appearance is kept.
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Cart::new();
        for item in items.into_iter().filter(|i| i.quantity > 0) {
            match cart
                .items
                .iter_mut()
                .find(|existing| existing.matches(&item.product_id, &item.variants))
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity)
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Parses the persisted JSON array and restores the invariants.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let items: Vec<LineItem> = serde_json::from_str(json)?;
        Ok(Cart::from_items(items))
    }

    /// Serializes the full item list for the persisted slot.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Lines in display order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Finds the line with the given identity.
    pub fn find(&self, product_id: &ProductId, variants: &VariantSelection) -> Option<&LineItem> {
        self.items.iter().find(|i| i.matches(product_id, variants))
    }

    /// Quantity currently held for the identity (0 if absent).
    pub fn quantity_of(&self, product_id: &ProductId, variants: &VariantSelection) -> u32 {
        self.find(product_id, variants).map_or(0, |i| i.quantity)
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - Same product and same selection already in cart: quantities sum
    /// - Otherwise: a new line snapshotting name, price and first image
    /// - Quantity 0: ignored, so a zero-quantity line can never appear
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        variants: VariantSelection,
    ) -> AddOutcome {
        if quantity == 0 {
            return AddOutcome::Ignored;
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.matches(&product.id, &variants))
        {
            item.quantity = item.quantity.saturating_add(quantity);
            return AddOutcome::Merged {
                quantity: item.quantity,
            };
        }

        self.items
            .push(LineItem::from_product(product, quantity, variants));
        AddOutcome::Added
    }

    /// Removes every line with the identity. Returns how many went away.
    pub fn remove_item(&mut self, product_id: &ProductId, variants: &VariantSelection) -> usize {
        let initial_len = self.items.len();
        self.items.retain(|i| !i.matches(product_id, variants));
        initial_len - self.items.len()
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: removes the line (never stores a zero line)
    /// - Identity not in cart: no-op
    /// - Values above `u32::MAX` saturate
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        variants: &VariantSelection,
        quantity: i64,
    ) -> QuantityChange {
        if quantity <= 0 {
            let lines = self.remove_item(product_id, variants);
            return QuantityChange::Removed { lines };
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self
            .items
            .iter_mut()
            .find(|i| i.matches(product_id, variants))
        {
            Some(item) => {
                item.quantity = quantity;
                QuantityChange::Updated
            }
            None => QuantityChange::NotInCart,
        }
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines (the header badge number).
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of unit price × quantity across all lines.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: u64,
    #[ts(type = "number")]
    pub subtotal: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_item_count(),
            subtotal: cart.total_price(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
