//! # Cart Store
//!
//! Owns the shopping cart for one application session and keeps it in
//! lockstep with its persisted slot.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CartStore Lifecycle                                  │
//! │                                                                         │
//! │  open() ──► read slot ("quickcommerce", "cart")                        │
//! │               │                                                         │
//! │               ├── absent ───────────────► empty cart                    │
//! │               ├── unreadable / corrupt ─► empty cart (warn, no error)   │
//! │               └── valid JSON ───────────► Cart::from_json (sanitized)   │
//! │                                                                         │
//! │  mutation ──► snapshot ──► apply to Cart ──► write full list to slot   │
//! │                                                 │                       │
//! │                                    ok ◄─────────┴─────────► err         │
//! │                                    │                         │          │
//! │                                    ▼                         ▼          │
//! │                              notify shopper          restore snapshot,  │
//! │                                                      return StoreError  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Construct one store at startup and pass `&mut CartStore` to whoever
//! needs it. There is no global instance. Mutations are synchronous: when
//! a call returns, the slot already holds the new list.

use quickcommerce_core::{
    AddOutcome, Cart, CartTotals, LineItem, Money, Product, ProductId, QuantityChange,
    VariantSelection, CART_STORAGE_KEY, CART_STORAGE_NAMESPACE,
};
use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::storage::SlotStorage;

/// The session's cart plus the slot it persists to.
pub struct CartStore<S: SlotStorage> {
    cart: Cart,
    storage: S,
    namespace: String,
    key: String,
    notifier: Box<dyn Notifier + Send + Sync>,
}

impl<S: SlotStorage> CartStore<S> {
    /// Opens the default cart slot and logs notifications.
    pub fn open(storage: S) -> Self {
        Self::open_with(
            storage,
            CART_STORAGE_NAMESPACE,
            CART_STORAGE_KEY,
            TracingNotifier,
        )
    }

    /// Opens a specific slot with a specific notifier.
    ///
    /// Never fails: whatever is wrong with the stored payload, the store
    /// starts from an empty cart.
    pub fn open_with(
        storage: S,
        namespace: impl Into<String>,
        key: impl Into<String>,
        notifier: impl Notifier + Send + Sync + 'static,
    ) -> Self {
        let namespace = namespace.into();
        let key = key.into();
        let cart = hydrate(&storage, &namespace, &key);

        debug!(
            namespace = %namespace,
            key = %key,
            lines = cart.line_count(),
            "Cart store opened"
        );

        CartStore {
            cart,
            storage,
            namespace,
            key,
            notifier: Box::new(notifier),
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds `quantity` of `product` with the given variant selection.
    ///
    /// Merges into an existing line with the same identity, otherwise
    /// appends a snapshot line. The product is assumed to exist; this call
    /// never fetches it.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        variants: VariantSelection,
    ) -> StoreResult<AddOutcome> {
        debug!(product_id = %product.id, quantity, variants = %variants.canonical(), "add_item");

        if quantity == 0 {
            debug!(product_id = %product.id, "Ignoring add of zero quantity");
            return Ok(AddOutcome::Ignored);
        }

        let outcome = self.mutate(|cart| cart.add_item(product, quantity, variants))?;
        let notification = match outcome {
            AddOutcome::Merged { .. } => Notification::QuantityUpdated {
                name: product.name.clone(),
            },
            _ => Notification::ItemAdded {
                name: product.name.clone(),
            },
        };
        self.notifier.notify(&notification);
        Ok(outcome)
    }

    /// Removes every line with this identity. Missing identity is a no-op.
    pub fn remove_item(
        &mut self,
        product_id: &ProductId,
        variants: &VariantSelection,
    ) -> StoreResult<usize> {
        debug!(product_id = %product_id, variants = %variants.canonical(), "remove_item");

        let removed = self.mutate(|cart| cart.remove_item(product_id, variants))?;
        self.notifier.notify(&Notification::ItemRemoved);
        Ok(removed)
    }

    /// Sets a line's quantity; zero or below removes the line.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        variants: &VariantSelection,
        quantity: i64,
    ) -> StoreResult<QuantityChange> {
        if quantity <= 0 {
            let lines = self.remove_item(product_id, variants)?;
            return Ok(QuantityChange::Removed { lines });
        }

        debug!(product_id = %product_id, quantity, "set_quantity");
        self.mutate(|cart| cart.set_quantity(product_id, variants, quantity))
    }

    /// Empties the cart.
    pub fn clear(&mut self) -> StoreResult<()> {
        debug!("clear");
        self.mutate(Cart::clear)?;
        self.notifier.notify(&Notification::CartCleared);
        Ok(())
    }

    /// Applies `f`, then writes the full list. On a failed write the cart is
    /// put back exactly as it was, so memory never runs ahead of the slot.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut Cart) -> T) -> StoreResult<T> {
        let snapshot = self.cart.clone();
        let result = f(&mut self.cart);

        if let Err(e) = self.persist() {
            warn!(error = %e, "Cart write failed, rolling back");
            self.cart = snapshot;
            return Err(e);
        }
        Ok(result)
    }

    fn persist(&self) -> StoreResult<()> {
        let json = self.cart.to_json()?;
        self.storage.write(&self.namespace, &self.key, &json)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Lines in display order.
    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.cart.line_count()
    }

    /// Sum of quantities across all lines.
    pub fn total_item_count(&self) -> u64 {
        self.cart.total_item_count()
    }

    /// Sum of unit price × quantity across all lines.
    pub fn total_price(&self) -> Money {
        self.cart.total_price()
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// Loads the cart from its slot, treating every failure as "no saved cart".
fn hydrate<S: SlotStorage>(storage: &S, namespace: &str, key: &str) -> Cart {
    let raw = match storage.read(namespace, key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, "Could not read saved cart, starting empty");
            return Cart::new();
        }
    };

    match Cart::from_json(&raw) {
        Ok(cart) => cart,
        Err(e) => {
            warn!(error = %e, "Saved cart is malformed, starting empty");
            Cart::new()
        }
    }
}

impl<S: SlotStorage + std::fmt::Debug> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("storage", &self.storage)
            .field("namespace", &self.namespace)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
