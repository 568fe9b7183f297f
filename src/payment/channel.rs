use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

/// Terminal outcome delivered for one payment confirmation subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Confirmed,
    Failed { reason: String },
}

/// Payload published on the payment-status channel by the payment backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusMessage {
    pub checkout_request_id: String,
    /// "SUCCESS" or "FAILED"; anything else is ignored
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_description: Option<String>,
}

/// A confirmation feed for payment pushes, multiplexed by correlation id.
///
/// Exactly one of success/failure is expected per subscription; subscribers
/// must tolerate zero firings (the push may never resolve).
pub trait ConfirmationChannel: Send + Sync {
    fn subscribe(&self, checkout_request_id: &str) -> Subscription;
}

/// Cancellable handle on one confirmation subscription.
///
/// Dropping the handle (or calling [`Subscription::cancel`]) tears the
/// subscription down on every exit path, including early returns and errors;
/// events for the subscribed id delivered afterwards go nowhere.
#[derive(Debug)]
pub struct Subscription {
    checkout_request_id: String,
    outcomes: mpsc::Receiver<PaymentOutcome>,
    _cancel: oneshot::Sender<()>,
}

impl Subscription {
    pub fn new(
        checkout_request_id: String,
        outcomes: mpsc::Receiver<PaymentOutcome>,
        cancel: oneshot::Sender<()>,
    ) -> Self {
        Self {
            checkout_request_id,
            outcomes,
            _cancel: cancel,
        }
    }

    pub fn checkout_request_id(&self) -> &str {
        &self.checkout_request_id
    }

    /// Waits for the outcome. `None` means the channel shut down without
    /// delivering one.
    pub async fn next(&mut self) -> Option<PaymentOutcome> {
        self.outcomes.recv().await
    }

    /// Explicit disposal; equivalent to dropping the handle.
    pub fn cancel(self) {}
}

/// In-process confirmation channel over a tokio broadcast bus.
///
/// The payment backend (or a test) publishes [`PaymentStatusMessage`]s; each
/// subscription filters for its own correlation id and forwards at most one
/// outcome before shutting itself down.
#[derive(Debug, Clone)]
pub struct BroadcastChannel {
    tx: broadcast::Sender<PaymentStatusMessage>,
}

impl BroadcastChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes a raw status message; returns the number of live listeners.
    pub fn publish(&self, message: PaymentStatusMessage) -> usize {
        self.tx.send(message).unwrap_or(0)
    }

    pub fn publish_success(&self, checkout_request_id: &str) -> usize {
        self.publish(PaymentStatusMessage {
            checkout_request_id: checkout_request_id.to_string(),
            status: "SUCCESS".to_string(),
            customer_message: None,
            response_description: None,
        })
    }

    pub fn publish_failure(&self, checkout_request_id: &str, reason: &str) -> usize {
        self.publish(PaymentStatusMessage {
            checkout_request_id: checkout_request_id.to_string(),
            status: "FAILED".to_string(),
            customer_message: Some(reason.to_string()),
            response_description: None,
        })
    }
}

impl Default for BroadcastChannel {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ConfirmationChannel for BroadcastChannel {
    fn subscribe(&self, checkout_request_id: &str) -> Subscription {
        let mut rx = self.tx.subscribe();
        let (out_tx, out_rx) = mpsc::channel(1);
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let id = checkout_request_id.to_string();

        let task_id = id.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    message = rx.recv() => match message {
                        Ok(m) if m.checkout_request_id == task_id => {
                            let outcome = match m.status.as_str() {
                                "SUCCESS" => PaymentOutcome::Confirmed,
                                "FAILED" => PaymentOutcome::Failed {
                                    reason: m
                                        .customer_message
                                        .or(m.response_description)
                                        .unwrap_or_else(|| "Payment failed".to_string()),
                                },
                                other => {
                                    debug!(status = other, "ignoring unknown payment status");
                                    continue;
                                }
                            };
                            let _ = out_tx.send(outcome).await;
                            break;
                        }
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!(skipped, "confirmation listener lagged");
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        Subscription::new(id, out_rx, cancel_tx)
    }
}
