//! # Backend
//!
//! Wires the mock services together and runs the flows that span more
//! than one of them: checkout and the admin dashboard.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Backend Startup                                  │
//! │                                                                         │
//! │  BackendConfig::new()                                                  │
//! │       .latency(SimulatedLatency::none())   ← optional                  │
//! │       .persist_to(storage)                 ← optional                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Backend::new(config)                                                  │
//! │       │                                                                 │
//! │       ├── parse embedded products.json / orders.json                   │
//! │       │                                                                 │
//! │       ├── storage? ── yes ──► load ("quickcommerce", "products"),      │
//! │       │                       ("quickcommerce", "orders"), else seed    │
//! │       │   no                                                            │
//! │       ▼                                                                 │
//! │  CatalogService + OrderService (in memory)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Checkout
//! ```text
//!  CartStore ──► build_order(cart, form) ──► OrderService::submit
//!                                                   │
//!                          ┌────────────────────────┘
//!                          ▼
//!            CatalogService::decrement_stock (each line)
//!                          │
//!                          ▼
//!                   CartStore::clear ──► Order
//! ```
//! Any failure before `submit` returns leaves the cart untouched.

use quickcommerce_core::checkout::build_order;
use quickcommerce_core::{CheckoutForm, Order, OrderStats, Product, LOW_STOCK_REPORT_THRESHOLD};
use serde::Serialize;
use tracing::{info, warn};

use crate::cart_store::CartStore;
use crate::catalog::CatalogService;
use crate::error::StoreResult;
use crate::latency::SimulatedLatency;
use crate::orders::OrderService;
use crate::snapshot::{SharedStorage, SnapshotSlot};
use crate::storage::SlotStorage;
use crate::{ORDERS_SNAPSHOT_KEY, PRODUCTS_SNAPSHOT_KEY, SNAPSHOT_NAMESPACE};

const SEED_PRODUCTS: &str = include_str!("../data/products.json");
const SEED_ORDERS: &str = include_str!("../data/orders.json");

/// Parses the embedded product catalog.
pub fn seed_products() -> StoreResult<Vec<Product>> {
    Ok(serde_json::from_str(SEED_PRODUCTS)?)
}

/// Parses the embedded order history.
pub fn seed_orders() -> StoreResult<Vec<Order>> {
    Ok(serde_json::from_str(SEED_ORDERS)?)
}

// =============================================================================
// Configuration
// =============================================================================

/// Backend configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = BackendConfig::new()
///     .latency(SimulatedLatency::none())
///     .persist_to(Arc::new(FileStorage::new(data_dir)));
/// ```
#[derive(Clone, Default)]
pub struct BackendConfig {
    /// Delay profile of every service call.
    /// Default: the production-like profile
    pub latency: SimulatedLatency,

    /// Where service state is saved between runs.
    /// Default: none (state lives only as long as the process)
    pub storage: Option<SharedStorage>,
}

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latency(mut self, latency: SimulatedLatency) -> Self {
        self.latency = latency;
        self
    }

    pub fn persist_to(mut self, storage: SharedStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// No latency, no persistence (for testing).
    pub fn in_memory() -> Self {
        BackendConfig::new().latency(SimulatedLatency::none())
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("latency", &self.latency)
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Counters for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub orders: OrderStats,
    pub product_count: usize,
    /// Products at or below the low-stock report threshold.
    pub low_stock_count: usize,
}

// =============================================================================
// Backend
// =============================================================================

/// Handle to the mock services. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Backend {
    catalog: CatalogService,
    orders: OrderService,
    snapshots: Option<(SnapshotSlot, SnapshotSlot)>,
}

impl Backend {
    /// Builds the services from the embedded seed data (or saved state).
    ///
    /// ## Errors
    /// Only if the embedded seed JSON fails to parse.
    pub fn new(config: BackendConfig) -> StoreResult<Self> {
        let products = seed_products()?;
        let orders = seed_orders()?;

        let backend = match config.storage {
            Some(storage) => {
                let product_slot =
                    SnapshotSlot::new(storage.clone(), SNAPSHOT_NAMESPACE, PRODUCTS_SNAPSHOT_KEY);
                let order_slot =
                    SnapshotSlot::new(storage, SNAPSHOT_NAMESPACE, ORDERS_SNAPSHOT_KEY);
                Backend {
                    catalog: CatalogService::with_snapshot(
                        products,
                        config.latency,
                        product_slot.clone(),
                    ),
                    orders: OrderService::with_snapshot(orders, config.latency, order_slot.clone()),
                    snapshots: Some((product_slot, order_slot)),
                }
            }
            None => Backend {
                catalog: CatalogService::new(products, config.latency),
                orders: OrderService::new(orders, config.latency),
                snapshots: None,
            },
        };

        info!(
            latency = config.latency.is_enabled(),
            persistent = backend.snapshots.is_some(),
            "Backend ready"
        );
        Ok(backend)
    }

    /// Shorthand for `Backend::new(BackendConfig::in_memory())`.
    pub fn in_memory() -> StoreResult<Self> {
        Self::new(BackendConfig::in_memory())
    }

    /// Returns the catalog service.
    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    /// Returns the order service.
    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    /// Throws away saved service state and reloads the seed data.
    pub async fn reset(&self) -> StoreResult<()> {
        if let Some((products, orders)) = &self.snapshots {
            products.clear()?;
            orders.clear()?;
        }
        self.catalog.replace_all(seed_products()?).await?;
        self.orders.replace_all(seed_orders()?).await?;
        info!("Backend reset to seed data");
        Ok(())
    }

    /// Places an order for everything in the cart.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`](quickcommerce_core::CoreError::EmptyCart)
    /// - a validation error for the first bad form field
    /// - whatever the order service returns
    ///
    /// The cart is only cleared once the order exists. A stock update or
    /// cart clear that fails afterwards is logged; the order stands.
    pub async fn checkout<S: SlotStorage>(
        &self,
        cart: &mut CartStore<S>,
        form: &CheckoutForm,
    ) -> StoreResult<Order> {
        let payload = build_order(cart.cart(), form)?;
        let order = self.orders.submit(payload).await?;

        for item in &order.items {
            if let Err(e) = self
                .catalog
                .decrement_stock(&item.product_id, item.quantity)
                .await
            {
                warn!(
                    order_id = %order.id,
                    product_id = %item.product_id,
                    error = %e,
                    "Could not update stock for ordered line"
                );
            }
        }

        if let Err(e) = cart.clear() {
            warn!(order_id = %order.id, error = %e, "Order placed but cart could not be cleared");
        }

        info!(order_id = %order.id, total = %order.total, "Checkout complete");
        Ok(order)
    }

    /// Order stats plus catalog counters for the dashboard.
    pub async fn dashboard(&self) -> StoreResult<DashboardStats> {
        let (orders, products, low_stock) = tokio::join!(
            self.orders.stats(),
            self.catalog.fetch_all(),
            self.catalog.low_stock(Some(LOW_STOCK_REPORT_THRESHOLD)),
        );

        Ok(DashboardStats {
            orders: orders?,
            product_count: products?.len(),
            low_stock_count: low_stock?.len(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::notify::BufferedNotifier;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;
    use quickcommerce_core::{
        CoreError, OrderStatus, ProductId, VariantSelection, CART_STORAGE_KEY,
        CART_STORAGE_NAMESPACE,
    };

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

    fn cart(storage: MemoryStorage) -> CartStore<MemoryStorage> {
        CartStore::open_with(
            storage,
            CART_STORAGE_NAMESPACE,
            CART_STORAGE_KEY,
            BufferedNotifier::new(),
        )
    }

    #[test]
    fn test_seed_data_parses() {
        let products = seed_products().unwrap();
        assert_eq!(products.len(), 10);
        assert!(products.iter().any(|p| !p.variants.is_empty()));
        assert!(products.iter().all(|p| !p.images.is_empty()));

        let orders = seed_orders().unwrap();
        assert_eq!(orders.len(), 4);
        assert_eq!(orders[0].id, "ORD-001");
        assert_eq!(orders[0].total.cents(), 7910);
    }

    #[tokio::test]
    async fn test_checkout_places_order_and_clears_cart() {
        let backend = Backend::in_memory().unwrap();
        let mut cart = cart(MemoryStorage::new());

        let tee = backend.catalog().fetch_by_id(&ProductId::from(1)).await.unwrap();
        let selection = tee.default_selection();
        cart.add_item(&tee, 2, selection.clone()).unwrap();

        let order = backend.checkout(&mut cart, &form()).await.unwrap();

        assert_eq!(order.id, "ORD-005");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items[0].variant, selection);
        // 49.98 + 10.00 shipping + 4.00 tax
        assert_eq!(order.total.cents(), 6398);
        assert!(cart.is_empty());

        let tee = backend.catalog().fetch_by_id(&ProductId::from(1)).await.unwrap();
        assert_eq!(tee.stock, 43);
    }

    #[tokio::test]
    async fn test_checkout_failure_keeps_cart() {
        let backend = Backend::in_memory().unwrap();
        let mut cart = cart(MemoryStorage::new());

        assert!(matches!(
            backend.checkout(&mut cart, &form()).await,
            Err(StoreError::Core(CoreError::EmptyCart))
        ));

        let lamp = backend.catalog().fetch_by_id(&ProductId::from(8)).await.unwrap();
        cart.add_item(&lamp, 1, VariantSelection::new()).unwrap();

        let mut bad = form();
        bad.zip_code = "ABCDE".to_string();
        assert!(backend.checkout(&mut cart, &bad).await.is_err());
        assert_eq!(cart.line_count(), 1);
        assert_eq!(backend.orders().list_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_checkout_skips_deleted_product_stock() {
        let backend = Backend::in_memory().unwrap();
        let mut cart = cart(MemoryStorage::new());

        let lamp = backend.catalog().fetch_by_id(&ProductId::from(8)).await.unwrap();
        cart.add_item(&lamp, 1, VariantSelection::new()).unwrap();
        backend.catalog().delete(&lamp.id).await.unwrap();

        let order = backend.checkout(&mut cart, &form()).await.unwrap();
        assert_eq!(order.items[0].product_name, "Desk Lamp");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard() {
        let backend = Backend::in_memory().unwrap();
        let stats = backend.dashboard().await.unwrap();

        assert_eq!(stats.product_count, 10);
        // Headphones 12, Backpack 8, Shoes 0, Watch 18, Lamp 5
        assert_eq!(stats.low_stock_count, 5);
        assert_eq!(stats.orders.total, 4);
        assert_eq!(stats.orders.count(OrderStatus::Pending), 1);
    }

    #[tokio::test]
    async fn test_persistent_backend_and_reset() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        let config = BackendConfig::in_memory().persist_to(storage.clone());

        let first = Backend::new(config.clone()).unwrap();
        first
            .orders()
            .update_status("ORD-004", OrderStatus::Shipped)
            .await
            .unwrap();
        first.catalog().delete(&ProductId::from(10)).await.unwrap();

        let second = Backend::new(config.clone()).unwrap();
        let order = second.orders().get_by_id("ORD-004").await.unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(second.catalog().fetch_all().await.unwrap().len(), 9);

        second.reset().await.unwrap();
        assert_eq!(second.catalog().fetch_all().await.unwrap().len(), 10);

        let third = Backend::new(config).unwrap();
        let order = third.orders().get_by_id("ORD-004").await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }
}
