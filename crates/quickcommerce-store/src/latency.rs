//! # Simulated Latency
//!
//! The mock services answer from memory, but the storefront was built
//! against network calls. Each service operation sleeps for a fixed delay
//! first so that loading states stay honest.
//!
//! ```text
//! ┌──────────────────────────┬─────────┐   ┌──────────────────────────┬─────────┐
//! │ Catalog                  │ Default │   │ Orders                   │ Default │
//! ├──────────────────────────┼─────────┤   ├──────────────────────────┼─────────┤
//! │ list_categories          │  150ms  │   │ recent                   │  200ms  │
//! │ search / stock / low     │  200ms  │   │ get_by_id / stats        │  250ms  │
//! │ fetch_by_id              │  250ms  │   │ list / status / delete   │  300ms  │
//! │ fetch_all / category     │  300ms  │   │ submit                   │  500ms  │
//! │ browse / delete          │  300ms  │   └──────────────────────────┴─────────┘
//! │ update                   │  350ms  │
//! │ create                   │  400ms  │
//! └──────────────────────────┴─────────┘
//! ```

use std::time::Duration;

use tracing::trace;

/// A service operation with its own simulated delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchAll,
    FetchById,
    FetchByCategory,
    Search,
    ListCategories,
    Browse,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    DecrementStock,
    LowStock,
    ListOrders,
    GetOrder,
    ListOrdersByStatus,
    SubmitOrder,
    UpdateOrderStatus,
    DeleteOrder,
    RecentOrders,
    OrderStats,
}

impl Operation {
    /// Delay of the default profile.
    pub fn default_delay(self) -> Duration {
        let ms = match self {
            Operation::ListCategories => 150,
            Operation::Search
            | Operation::DecrementStock
            | Operation::LowStock
            | Operation::RecentOrders => 200,
            Operation::FetchById | Operation::GetOrder | Operation::OrderStats => 250,
            Operation::FetchAll
            | Operation::FetchByCategory
            | Operation::Browse
            | Operation::DeleteProduct
            | Operation::ListOrders
            | Operation::ListOrdersByStatus
            | Operation::UpdateOrderStatus
            | Operation::DeleteOrder => 300,
            Operation::UpdateProduct => 350,
            Operation::CreateProduct => 400,
            Operation::SubmitOrder => 500,
        };
        Duration::from_millis(ms)
    }
}

/// Latency profile shared by the mock services.
///
/// ## Example
/// ```rust,ignore
/// // Production-like delays
/// let latency = SimulatedLatency::default();
///
/// // Tests and scripted CLI runs
/// let latency = SimulatedLatency::none();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
    enabled: bool,
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        SimulatedLatency { enabled: true }
    }
}

impl SimulatedLatency {
    /// A profile that never sleeps.
    pub fn none() -> Self {
        SimulatedLatency { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// How long `op` waits under this profile.
    pub fn delay_for(&self, op: Operation) -> Duration {
        if self.enabled {
            op.default_delay()
        } else {
            Duration::ZERO
        }
    }

    /// Sleeps for the delay of `op`.
    pub async fn wait(&self, op: Operation) {
        let delay = self.delay_for(op);
        if delay.is_zero() {
            return;
        }
        trace!(?op, delay_ms = delay.as_millis() as u64, "Simulating latency");
        tokio::time::sleep(delay).await;
    }
}
