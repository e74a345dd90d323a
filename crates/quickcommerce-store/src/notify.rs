//! # Notifications
//!
//! Transient, user-facing messages emitted by cart mutations ("Added Widget
//! to cart"). They are advisory UI feedback, not part of the data contract.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::info;

/// What a cart mutation did, as the shopper should hear it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    ItemAdded { name: String },
    QuantityUpdated { name: String },
    ItemRemoved,
    CartCleared,
}

impl Notification {
    pub fn message(&self) -> String {
        match self {
            Notification::ItemAdded { name } => format!("Added {name} to cart"),
            Notification::QuantityUpdated { name } => {
                format!("Updated {name} quantity in cart")
            }
            Notification::ItemRemoved => "Item removed from cart".to_string(),
            Notification::CartCleared => "Cart cleared".to_string(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Receives notifications from the cart store.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Writes each notification to the log at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        info!(message = %notification, "Cart notification");
    }
}

/// Collects notifications so the presentation layer can render them as
/// toasts. Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferedNotifier {
    pending: Arc<Mutex<Vec<Notification>>>,
}

impl BufferedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every notification emitted since the last drain.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for BufferedNotifier {
    fn notify(&self, notification: &Notification) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
    }
}
