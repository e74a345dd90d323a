//! # quickcommerce-store: Persistence and Services for QuickCommerce
//!
//! Everything with a side effect lives here: the persisted cart, the mock
//! catalog and order services, and shopper notifications.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     QuickCommerce Data Flow                             │
//! │                                                                         │
//! │  CLI command (cart add 1 --variant Size=M)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               quickcommerce-store (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   CartStore   │    │    Backend    │    │   Notifier   │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ Cart (core)   │    │ CatalogService│    │ Tracing      │  │   │
//! │  │   │ + slot writes │    │ OrderService  │    │ Buffered     │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           │                    │ (optional snapshots)          │   │
//! │  │           ▼                    ▼                               │   │
//! │  │   ┌─────────────────────────────────────────────┐             │   │
//! │  │   │  SlotStorage: MemoryStorage │ FileStorage   │             │   │
//! │  │   └─────────────────────────────────────────────┘             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  <data dir>/quickcommerce.cart.json                                    │
//! │  <data dir>/quickcommerce.products.json                                │
//! │  <data dir>/quickcommerce.orders.json                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`storage`] - Namespaced key-value slots (memory and file)
//! - [`cart_store`] - The session cart and its persistence
//! - [`notify`] - Shopper-facing notifications
//! - [`catalog`] - Product service with simulated latency
//! - [`orders`] - Order service with simulated latency
//! - [`backend`] - Service wiring, checkout and dashboard flows
//! - [`latency`] - Per-operation delay profile
//! - [`snapshot`] - Whole-list snapshots of service state
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quickcommerce_store::{Backend, CartStore, FileStorage};
//!
//! let mut cart = CartStore::open(FileStorage::new(data_dir));
//! let backend = Backend::in_memory()?;
//!
//! let product = backend.catalog().fetch_by_id(&ProductId::from(1)).await?;
//! cart.add_item(&product, 2, product.default_selection())?;
//! let order = backend.checkout(&mut cart, &form).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod cart_store;
pub mod catalog;
pub mod error;
pub mod latency;
pub mod notify;
pub mod orders;
pub mod snapshot;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{Backend, BackendConfig, DashboardStats};
pub use cart_store::CartStore;
pub use catalog::{CatalogService, ProductQuery, SortOrder};
pub use error::{StoreError, StoreResult};
pub use latency::SimulatedLatency;
pub use notify::{BufferedNotifier, Notification, Notifier, TracingNotifier};
pub use orders::OrderService;
pub use snapshot::SharedStorage;
pub use storage::{FileStorage, MemoryStorage, SlotStorage};

// =============================================================================
// Slot Names
// =============================================================================

/// Namespace of the service snapshots (shared with the cart slot).
pub const SNAPSHOT_NAMESPACE: &str = quickcommerce_core::CART_STORAGE_NAMESPACE;

/// Key of the catalog snapshot.
pub const PRODUCTS_SNAPSHOT_KEY: &str = "products";

/// Key of the order snapshot.
pub const ORDERS_SNAPSHOT_KEY: &str = "orders";
