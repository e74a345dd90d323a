//! # Order Service
//!
//! Accepts order payloads from checkout and backs the admin order views.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  NewOrder ──► submit() ──► Order { id: "ORD-007", status: pending }    │
//! │                                   │                                     │
//! │                     update_status()                                     │
//! │                                   ▼                                     │
//! │            pending ─► processing ─► shipped ─► delivered               │
//! │                                                                         │
//! │  Admins may set any status at any time; the service does not enforce   │
//! │  the forward direction.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use quickcommerce_core::validation::{validate_email, validate_required};
use quickcommerce_core::{order_number, CoreError, NewOrder, Order, OrderStats, OrderStatus};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::latency::{Operation, SimulatedLatency};
use crate::snapshot::SnapshotSlot;

/// Number of orders on the dashboard's "recent orders" card.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Shared handle to the order list. Clones see the same data.
#[derive(Debug, Clone)]
pub struct OrderService {
    orders: Arc<RwLock<Vec<Order>>>,
    latency: SimulatedLatency,
    snapshot: Option<SnapshotSlot>,
}

impl OrderService {
    pub fn new(orders: Vec<Order>, latency: SimulatedLatency) -> Self {
        OrderService {
            orders: Arc::new(RwLock::new(orders)),
            latency,
            snapshot: None,
        }
    }

    /// Starts from the snapshot in `slot` (or `seed`) and writes every
    /// change back.
    pub fn with_snapshot(seed: Vec<Order>, latency: SimulatedLatency, slot: SnapshotSlot) -> Self {
        let orders = slot.load().unwrap_or(seed);
        OrderService {
            orders: Arc::new(RwLock::new(orders)),
            latency,
            snapshot: Some(slot),
        }
    }

    /// Every order, newest first.
    pub async fn list_all(&self) -> StoreResult<Vec<Order>> {
        self.latency.wait(Operation::ListOrders).await;
        Ok(newest_first(self.orders.read().await.clone()))
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Order> {
        self.latency.wait(Operation::GetOrder).await;
        self.orders
            .read()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Order", id))
    }

    /// Orders in `status`, in submission order.
    pub async fn list_by_status(&self, status: OrderStatus) -> StoreResult<Vec<Order>> {
        self.latency.wait(Operation::ListOrdersByStatus).await;
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.status == status)
            .cloned()
            .collect())
    }

    /// Records a new pending order.
    ///
    /// ## Numbering
    /// The id is `ORD-` plus the order count after insertion, zero-padded
    /// to three digits. If an admin deleted an order earlier and that
    /// number is already taken, the next free number is used instead.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`] when the payload has no items
    /// - [`StoreError::Validation`] for a missing name or a malformed email
    pub async fn submit(&self, payload: NewOrder) -> StoreResult<Order> {
        self.latency.wait(Operation::SubmitOrder).await;

        if payload.items.is_empty() || payload.items.iter().all(|i| i.quantity == 0) {
            return Err(CoreError::EmptyCart.into());
        }
        validate_required("name", &payload.customer.name)?;
        validate_email(&payload.customer.email)?;

        let mut orders = self.orders.write().await;
        let mut sequence = orders.len() + 1;
        while orders.iter().any(|o| o.id == order_number(sequence)) {
            sequence += 1;
        }

        let order = Order::from_new(payload, order_number(sequence), Utc::now());
        let mut next = orders.clone();
        next.push(order.clone());
        self.commit(&mut orders, next)?;

        info!(
            order_id = %order.id,
            total = %order.total,
            items = order.items.len(),
            "Order submitted"
        );
        Ok(order)
    }

    pub async fn update_status(&self, id: &str, status: OrderStatus) -> StoreResult<Order> {
        self.latency.wait(Operation::UpdateOrderStatus).await;

        let mut orders = self.orders.write().await;
        let index = position(&orders, id)?;

        let mut next = orders.clone();
        next[index].status = status;
        let updated = next[index].clone();
        self.commit(&mut orders, next)?;

        info!(order_id = %id, status = %status, "Order status updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.latency.wait(Operation::DeleteOrder).await;

        let mut orders = self.orders.write().await;
        let index = position(&orders, id)?;

        let mut next = orders.clone();
        next.remove(index);
        self.commit(&mut orders, next)?;

        info!(order_id = %id, "Order deleted");
        Ok(())
    }

    /// The newest `limit` orders (default 5).
    pub async fn recent(&self, limit: Option<usize>) -> StoreResult<Vec<Order>> {
        self.latency.wait(Operation::RecentOrders).await;
        let mut orders = newest_first(self.orders.read().await.clone());
        orders.truncate(limit.unwrap_or(DEFAULT_RECENT_LIMIT));
        Ok(orders)
    }

    pub async fn stats(&self) -> StoreResult<OrderStats> {
        self.latency.wait(Operation::OrderStats).await;
        let stats = OrderStats::from_orders(&self.orders.read().await);
        debug!(total = stats.total, revenue = %stats.total_revenue, "Order stats");
        Ok(stats)
    }

    /// Replaces the whole list, e.g. when reseeding.
    pub async fn replace_all(&self, orders: Vec<Order>) -> StoreResult<()> {
        let mut current = self.orders.write().await;
        self.commit(&mut current, orders)
    }

    fn commit(
        &self,
        current: &mut RwLockWriteGuard<'_, Vec<Order>>,
        next: Vec<Order>,
    ) -> StoreResult<()> {
        if let Some(slot) = &self.snapshot {
            slot.save(&next)?;
        }
        **current = next;
        Ok(())
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

fn position(orders: &[Order], id: &str) -> StoreResult<usize> {
    orders
        .iter()
        .position(|o| o.id == id)
        .ok_or_else(|| StoreError::not_found("Order", id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::{Duration, TimeZone};
    use quickcommerce_core::{
        Customer, Money, OrderItem, ProductId, ShippingAddress, VariantSelection,
    };

    fn payload(cents: i64) -> NewOrder {
        NewOrder {
            items: vec![OrderItem {
                product_id: ProductId::from(1),
                product_name: "Widget".to_string(),
                quantity: 2,
                price: Money::from_cents(999),
                variant: VariantSelection::new(),
            }],
            customer: Customer {
                name: "Ana Lopez".to_string(),
                email: "ana@example.com".to_string(),
                phone: "555-123-4567".to_string(),
            },
            total: Money::from_cents(cents),
            shipping_address: ShippingAddress {
                street: "1 Market St".to_string(),
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                zip_code: "94105".to_string(),
                country: "USA".to_string(),
            },
        }
    }

    fn seeded() -> OrderService {
        let base = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let statuses = [
            OrderStatus::Delivered,
            OrderStatus::Shipped,
            OrderStatus::Pending,
        ];
        let orders = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mut order = Order::from_new(
                    payload(1000 * (i as i64 + 1)),
                    order_number(i + 1),
                    base + Duration::days(i as i64),
                );
                order.status = *status;
                order
            })
            .collect();
        OrderService::new(orders, SimulatedLatency::none())
    }

    fn ids(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let orders = seeded().list_all().await.unwrap();
        assert_eq!(ids(&orders), vec!["ORD-003", "ORD-002", "ORD-001"]);
    }

    #[tokio::test]
    async fn test_submit_numbers_and_marks_pending() {
        let service = seeded();
        let order = service.submit(payload(4237)).await.unwrap();

        assert_eq!(order.id, "ORD-004");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total.cents(), 4237);
        assert_eq!(service.get_by_id("ORD-004").await.unwrap(), order);
        assert_eq!(ids(&service.recent(Some(1)).await.unwrap()), vec!["ORD-004"]);
    }

    #[tokio::test]
    async fn test_submit_skips_taken_number() {
        let service = seeded();
        service.delete("ORD-001").await.unwrap();

        // Two orders left, so ORD-003 would be next but is taken
        let order = service.submit(payload(100)).await.unwrap();
        assert_eq!(order.id, "ORD-004");
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_payload() {
        let service = OrderService::new(vec![], SimulatedLatency::none());

        let mut empty = payload(0);
        empty.items.clear();
        assert!(matches!(
            service.submit(empty).await,
            Err(StoreError::Core(CoreError::EmptyCart))
        ));

        let mut bad_email = payload(100);
        bad_email.customer.email = "ana".to_string();
        assert!(matches!(
            service.submit(bad_email).await,
            Err(StoreError::Validation(_))
        ));

        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_and_filter() {
        let service = seeded();
        service
            .update_status("ORD-003", OrderStatus::Processing)
            .await
            .unwrap();

        let processing = service.list_by_status(OrderStatus::Processing).await.unwrap();
        assert_eq!(ids(&processing), vec!["ORD-003"]);
        assert!(service
            .list_by_status(OrderStatus::Pending)
            .await
            .unwrap()
            .is_empty());

        assert!(service
            .update_status("ORD-999", OrderStatus::Shipped)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_stats() {
        let stats = seeded().stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.shipped, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.processing, 0);
        assert_eq!(stats.total_revenue.cents(), 6000);
    }

    #[tokio::test]
    async fn test_recent_default_limit() {
        let service = seeded();
        for _ in 0..4 {
            service.submit(payload(100)).await.unwrap();
        }
        assert_eq!(service.recent(None).await.unwrap().len(), DEFAULT_RECENT_LIMIT);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        assert!(seeded().delete("ORD-042").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_snapshot_survives_new_service() {
        let storage = Arc::new(MemoryStorage::new());
        let slot = || SnapshotSlot::new(storage.clone(), "quickcommerce", "orders");

        let first = OrderService::with_snapshot(vec![], SimulatedLatency::none(), slot());
        first.submit(payload(100)).await.unwrap();

        let second = OrderService::with_snapshot(vec![], SimulatedLatency::none(), slot());
        assert_eq!(ids(&second.list_all().await.unwrap()), vec!["ORD-001"]);
    }
}
