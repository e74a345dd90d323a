//! # State Module
//!
//! Everything a command needs, opened once per invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │                    AppState::open(config)                               │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │  CartStore   │  │   Backend    │  │    AppConfig     │              │
//! │  │              │  │              │  │                  │              │
//! │  │  cart slot   │  │  catalog +   │  │  data_dir        │              │
//! │  │  + notifier  │  │  orders      │  │  currency        │              │
//! │  └──────┬───────┘  └──────┬───────┘  └──────────────────┘              │
//! │         │                 │                                             │
//! │         └────────┬────────┘                                             │
//! │                  ▼                                                      │
//! │        one FileStorage (Arc) over <data dir>                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;

pub use config::{default_data_dir, AppConfig};

use std::sync::Arc;

use quickcommerce_core::{CART_STORAGE_KEY, CART_STORAGE_NAMESPACE};
use quickcommerce_store::{
    Backend, BackendConfig, BufferedNotifier, CartStore, FileStorage, Notification,
    SharedStorage, SimulatedLatency,
};
use tracing::debug;

use crate::error::CliResult;

/// State shared by all commands of one invocation.
pub struct AppState {
    pub config: AppConfig,
    pub cart: CartStore<SharedStorage>,
    pub backend: Backend,
    notifications: BufferedNotifier,
}

impl AppState {
    /// Opens the cart and services over the configured data directory.
    pub fn open(config: AppConfig) -> CliResult<Self> {
        let dir = config.resolve_data_dir()?;
        debug!(data_dir = %dir.display(), "Opening data directory");
        Self::with_storage(config, Arc::new(FileStorage::new(dir)))
    }

    /// Opens the cart and services over any storage.
    pub fn with_storage(config: AppConfig, storage: SharedStorage) -> CliResult<Self> {
        let latency = if config.simulate_latency {
            SimulatedLatency::default()
        } else {
            SimulatedLatency::none()
        };
        let backend = Backend::new(
            BackendConfig::new()
                .latency(latency)
                .persist_to(storage.clone()),
        )?;

        let notifications = BufferedNotifier::new();
        let cart = CartStore::open_with(
            storage,
            CART_STORAGE_NAMESPACE,
            CART_STORAGE_KEY,
            notifications.clone(),
        );

        Ok(AppState {
            config,
            cart,
            backend,
            notifications,
        })
    }

    /// Notifications raised by cart mutations since the last call.
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.notifications.drain()
    }
}
