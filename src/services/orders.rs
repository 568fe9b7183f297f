use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::errors::CheckoutError;
use crate::models::{CartLine, Order};

/// Payload handed to the sale recorder on a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub order: Order,
    pub sale_number: String,
    /// Always "COMPLETED" for a committed sale
    pub payment_status: String,
    pub amount_received: Decimal,
    /// Snapshot of the cart as tendered
    pub cart_items: Vec<CartLine>,
}

/// Persists completed sales. A rejection leaves the checkout open with
/// nothing committed.
#[async_trait]
pub trait SaleRecorder: Send + Sync {
    async fn record(&self, sale: SaleRecord) -> Result<(), CheckoutError>;
}

/// Best-effort store of parked, not-yet-paid orders.
#[async_trait]
pub trait PendingOrderStore: Send + Sync {
    async fn park(&self, order: Order) -> Result<(), CheckoutError>;
}

/// In-memory pending-order queue keyed by order id, for a terminal that
/// resumes parked orders locally.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPendingOrders {
    orders: Arc<DashMap<Uuid, Order>>,
}

impl InMemoryPendingOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<Order> {
        self.orders.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Removes and returns a parked order, e.g. when it is resumed for
    /// payment.
    pub fn take(&self, order_id: Uuid) -> Option<Order> {
        self.orders.remove(&order_id).map(|(_, order)| order)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl PendingOrderStore for InMemoryPendingOrders {
    async fn park(&self, order: Order) -> Result<(), CheckoutError> {
        info!(order_id = %order.id, order_number = %order.order_number, "parking pending order");
        self.orders.insert(order.id, order);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderStatus, OrderType, PaymentMethod};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn pending_order() -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-12345678".into(),
            items: vec![],
            customer: None,
            subtotal: dec!(344.83),
            discount: Decimal::ZERO,
            tax: dec!(55.17),
            total: dec!(400),
            order_type: OrderType::TakeAway,
            table_number: None,
            location_id: None,
            datetime: Utc::now(),
            notes: String::new(),
            status: OrderStatus::PendingPayment,
            payment_method: PaymentMethod::Cash,
            sale_number: "SALE-123456-AB12".into(),
            amount_paid: Decimal::ZERO,
            change: Decimal::ZERO,
            mobile_payment_phone: None,
        }
    }

    #[tokio::test]
    async fn parked_orders_can_be_listed_and_taken() {
        let store = InMemoryPendingOrders::new();
        let order = pending_order();
        let id = order.id;

        store.park(order).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].id, id);

        let taken = store.take(id).unwrap();
        assert_eq!(taken.status, OrderStatus::PendingPayment);
        assert!(store.is_empty());
        assert!(store.take(id).is_none());
    }
}
