use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::models::order::PaymentMethod;

/// Events emitted while a checkout attempt progresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CheckoutOpened {
        order_id: Uuid,
        sale_number: String,
        total_payable: Decimal,
    },
    PaymentInitiated {
        checkout_request_id: String,
        phone_number: String,
        amount: Decimal,
    },
    PaymentConfirmed {
        checkout_request_id: String,
    },
    PaymentFailed {
        checkout_request_id: Option<String>,
        reason: String,
    },
    SaleCompleted {
        order_id: Uuid,
        sale_number: String,
        payment_method: PaymentMethod,
        total: Decimal,
        timestamp: DateTime<Utc>,
    },
    OrderParked {
        order_id: Uuid,
        total: Decimal,
        timestamp: DateTime<Utc>,
    },
    CheckoutClosed {
        order_id: Uuid,
    },
}

/// Cloneable handle for publishing checkout events.
///
/// Sends are best-effort: a full or closed channel is logged and never fails
/// the operation that produced the event.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with its receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Failed to send checkout event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_the_receiver() {
        let (sender, mut rx) = EventSender::channel(8);
        sender
            .send(Event::PaymentConfirmed {
                checkout_request_id: "ws_CO_123".into(),
            })
            .await;

        match rx.recv().await {
            Some(Event::PaymentConfirmed {
                checkout_request_id,
            }) => assert_eq!(checkout_request_id, "ws_CO_123"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_on_closed_channel_is_swallowed() {
        let (sender, rx) = EventSender::channel(1);
        drop(rx);
        sender
            .send(Event::CheckoutClosed {
                order_id: Uuid::new_v4(),
            })
            .await;
    }
}
