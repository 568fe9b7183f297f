use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::CheckoutConfig;
use crate::errors::CheckoutError;
use crate::events::{Event, EventSender};
use crate::host::HostBridge;
use crate::models::{CartLine, Customer, Order, OrderStatus, OrderType, PaymentMethod};
use crate::payment::{
    ConfirmationChannel, MobilePaymentSession, MobilePaymentStatus, PaymentInitiator,
    PaymentOutcome, Subscription,
};
use crate::phone::{profile_for, PhoneProfile};
use crate::pricing::{change_due, CurrencyFormatter, MonetaryBreakdown};
use crate::services::orders::{PendingOrderStore, SaleRecord, SaleRecorder};

/// Orchestrates one in-progress sale to a terminal outcome: a confirmed
/// mobile payment, a cash tender with change, a card attestation, or a
/// parked pending order.
#[derive(Clone)]
pub struct CheckoutService {
    initiator: Arc<dyn PaymentInitiator>,
    confirmations: Arc<dyn ConfirmationChannel>,
    recorder: Arc<dyn SaleRecorder>,
    pending_orders: Arc<dyn PendingOrderStore>,
    host: Arc<dyn HostBridge>,
    events: EventSender,
    config: CheckoutConfig,
    phone_profile: PhoneProfile,
    formatter: CurrencyFormatter,
}

/// State owned by one checkout attempt.
///
/// Created by [`CheckoutService::open`]; driven exclusively through the
/// service. Committing or parking closes the session for good; re-opening
/// checkout for the same cart starts a fresh session with a new identity.
#[derive(Debug)]
pub struct CheckoutSession {
    order_id: Uuid,
    sale_number: String,
    cart: Vec<CartLine>,
    customer: Option<Customer>,
    order_type: OrderType,
    table_number: Option<String>,
    notes: String,
    payment_method: PaymentMethod,
    breakdown: MonetaryBreakdown,
    cash_received: Decimal,
    mobile: MobilePaymentSession,
    confirmation: Option<Subscription>,
    committing: bool,
    closed: bool,
}

impl CheckoutSession {
    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn sale_number(&self) -> &str {
        &self.sale_number
    }

    pub fn breakdown(&self) -> &MonetaryBreakdown {
        &self.breakdown
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn mobile(&self) -> &MobilePaymentSession {
        &self.mobile
    }

    pub fn cash_received(&self) -> Decimal {
        self.cash_received
    }

    pub fn change(&self) -> Decimal {
        change_due(self.cash_received, self.breakdown.total_payable)
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn customer_phone(&self) -> Option<String> {
        self.customer.as_ref().and_then(|c| c.phone.clone())
    }
}

impl CheckoutService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initiator: Arc<dyn PaymentInitiator>,
        confirmations: Arc<dyn ConfirmationChannel>,
        recorder: Arc<dyn SaleRecorder>,
        pending_orders: Arc<dyn PendingOrderStore>,
        host: Arc<dyn HostBridge>,
        events: EventSender,
        config: CheckoutConfig,
    ) -> Self {
        let phone_profile = profile_for(&config.phone_country);
        let formatter = CurrencyFormatter::new(config.currency_code.clone(), config.locale.clone());
        Self {
            initiator,
            confirmations,
            recorder,
            pending_orders,
            host,
            events,
            config,
            phone_profile,
            formatter,
        }
    }

    pub fn formatter(&self) -> &CurrencyFormatter {
        &self.formatter
    }

    pub fn phone_profile(&self) -> &PhoneProfile {
        &self.phone_profile
    }

    /// Opens a checkout attempt for a cart, deriving the monetary breakdown
    /// and preparing a fresh mobile-payment session.
    #[instrument(skip(self, cart, customer))]
    pub async fn open(
        &self,
        cart: Vec<CartLine>,
        customer: Option<Customer>,
        discount: Decimal,
        order_type: OrderType,
        table_number: Option<String>,
    ) -> Result<CheckoutSession, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::InvalidOperation("Cart is empty".to_string()));
        }

        let subtotal: Decimal = cart.iter().map(CartLine::line_total).sum();
        let breakdown = MonetaryBreakdown::compute(subtotal, discount, self.config.tax_rate());

        let order_id = Uuid::new_v4();
        let sale_number = generate_sale_number();
        let mobile = MobilePaymentSession::new(
            customer.as_ref().and_then(|c| c.phone.as_deref()),
        );

        info!(%order_id, %sale_number, total = %breakdown.total_payable, "checkout opened");
        self.events
            .send(Event::CheckoutOpened {
                order_id,
                sale_number: sale_number.clone(),
                total_payable: breakdown.total_payable,
            })
            .await;

        Ok(CheckoutSession {
            order_id,
            sale_number,
            cart,
            customer,
            order_type,
            table_number,
            notes: String::new(),
            payment_method: PaymentMethod::MobilePayment,
            cash_received: breakdown.total_payable,
            breakdown,
            mobile,
            confirmation: None,
            committing: false,
            closed: false,
        })
    }

    /// Selects the payment method. Switching onto mobile payment starts the
    /// mobile sub-flow over from idle.
    pub fn set_payment_method(
        &self,
        session: &mut CheckoutSession,
        method: PaymentMethod,
    ) -> Result<(), CheckoutError> {
        if session.committing {
            return Err(CheckoutError::InvalidOperation(
                "Sale commit in flight".to_string(),
            ));
        }
        if method == PaymentMethod::MobilePayment && session.payment_method != method {
            session.confirmation = None;
            let phone = session.customer_phone();
            session.mobile.reset(phone.as_deref());
        }
        session.payment_method = method;
        Ok(())
    }

    /// Updates the phone field, validating as the user types.
    pub fn set_phone(&self, session: &mut CheckoutSession, value: &str) {
        session.mobile.set_phone(value, &self.phone_profile);
    }

    pub fn set_cash_received(&self, session: &mut CheckoutSession, amount: Decimal) {
        session.cash_received = amount;
    }

    /// Sends (or resends) the payment push to the customer's phone and
    /// subscribes for its confirmation.
    ///
    /// Submitting with a validation error or an empty phone is a silent
    /// no-op.
    #[instrument(skip(self, session), fields(sale_number = %session.sale_number))]
    pub async fn send_push(&self, session: &mut CheckoutSession) -> Result<(), CheckoutError> {
        if session.closed {
            return Err(CheckoutError::InvalidOperation(
                "Checkout already closed".to_string(),
            ));
        }
        if !session.mobile.can_submit() {
            return Ok(());
        }

        let normalized = session.mobile.begin_sending(&self.phone_profile)?;
        let amount = session.breakdown.total_payable;
        info!(phone = %normalized, %amount, "sending payment push");

        match self
            .initiator
            .initiate(&normalized, amount, &session.sale_number)
            .await
        {
            Ok(checkout_request_id) => {
                session.mobile.mark_sent(checkout_request_id.clone());
                session.confirmation = Some(self.confirmations.subscribe(&checkout_request_id));
                self.events
                    .send(Event::PaymentInitiated {
                        checkout_request_id,
                        phone_number: normalized,
                        amount,
                    })
                    .await;
                Ok(())
            }
            Err(e) => {
                error!("payment push failed: {}", e);
                session.mobile.mark_failed();
                session.confirmation = None;
                self.events
                    .send(Event::PaymentFailed {
                        checkout_request_id: None,
                        reason: e.to_string(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    /// Waits for the confirmation of the push currently in `Sent` state.
    ///
    /// The subscription is consumed on every exit path, so a stale event for
    /// this push delivered later goes nowhere. With a configured deadline the
    /// wait fails the session on expiry; otherwise it is unbounded.
    #[instrument(skip(self, session), fields(sale_number = %session.sale_number))]
    pub async fn await_confirmation(
        &self,
        session: &mut CheckoutSession,
    ) -> Result<MobilePaymentStatus, CheckoutError> {
        if session.mobile.status != MobilePaymentStatus::Sent {
            return Err(CheckoutError::InvalidOperation(
                "No payment push awaiting confirmation".to_string(),
            ));
        }
        let mut subscription = session.confirmation.take().ok_or_else(|| {
            CheckoutError::InternalError("Confirmation subscription missing".to_string())
        })?;
        let checkout_request_id = subscription.checkout_request_id().to_string();

        let outcome = match self.config.confirmation_timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), subscription.next()).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(%checkout_request_id, "confirmation wait timed out");
                        session.mobile.mark_failed();
                        self.events
                            .send(Event::PaymentFailed {
                                checkout_request_id: Some(checkout_request_id),
                                reason: "Confirmation timed out".to_string(),
                            })
                            .await;
                        return Ok(MobilePaymentStatus::Failed);
                    }
                }
            }
            None => subscription.next().await,
        };

        match outcome {
            Some(PaymentOutcome::Confirmed) => {
                session.mobile.confirm();
                info!(%checkout_request_id, "payment confirmed");
                self.events
                    .send(Event::PaymentConfirmed {
                        checkout_request_id,
                    })
                    .await;
                Ok(MobilePaymentStatus::Confirmed)
            }
            Some(PaymentOutcome::Failed { reason }) => {
                session.mobile.mark_failed();
                warn!(%checkout_request_id, %reason, "payment declined");
                self.events
                    .send(Event::PaymentFailed {
                        checkout_request_id: Some(checkout_request_id),
                        reason,
                    })
                    .await;
                Ok(MobilePaymentStatus::Failed)
            }
            None => {
                warn!(%checkout_request_id, "confirmation channel closed without an outcome");
                session.mobile.mark_failed();
                Ok(MobilePaymentStatus::Failed)
            }
        }
    }

    /// "Change number": back to an idle mobile session, dropping any live
    /// confirmation subscription.
    pub fn change_number(&self, session: &mut CheckoutSession) {
        session.confirmation = None;
        let phone = session.customer_phone();
        session.mobile.reset(phone.as_deref());
    }

    /// Whether "Complete Payment" is currently permitted.
    pub fn can_commit(&self, session: &CheckoutSession) -> bool {
        if session.closed || session.committing {
            return false;
        }
        match session.payment_method {
            PaymentMethod::Cash => session.cash_received >= session.breakdown.total_payable,
            PaymentMethod::MobilePayment => {
                session.mobile.status == MobilePaymentStatus::Confirmed
            }
            // Manual attestation: the operator asserts the terminal
            // transaction succeeded and this is not verified.
            PaymentMethod::CreditCard => true,
        }
    }

    /// Commits the sale: builds the completed order, hands it to the sale
    /// recorder, and closes the checkout.
    ///
    /// A recorder rejection leaves the session open with nothing committed.
    #[instrument(skip(self, session), fields(sale_number = %session.sale_number))]
    pub async fn commit_sale(
        &self,
        session: &mut CheckoutSession,
    ) -> Result<Order, CheckoutError> {
        if session.closed {
            return Err(CheckoutError::InvalidOperation(
                "Checkout already closed".to_string(),
            ));
        }
        if session.committing {
            return Err(CheckoutError::InvalidOperation(
                "Sale commit in flight".to_string(),
            ));
        }
        if !self.can_commit(session) {
            return Err(CheckoutError::InvalidOperation(
                "Payment is not ready to commit".to_string(),
            ));
        }

        session.committing = true;
        let order = self.build_order(session, OrderStatus::Completed, session.payment_method);
        let record = SaleRecord {
            order: order.clone(),
            sale_number: session.sale_number.clone(),
            payment_status: "COMPLETED".to_string(),
            amount_received: order.amount_paid,
            cart_items: session.cart.clone(),
        };

        match self.recorder.record(record).await {
            Ok(()) => {
                session.committing = false;
                session.closed = true;
                session.confirmation = None;
                info!(order_id = %order.id, method = %order.payment_method, "sale completed");
                self.events
                    .send(Event::SaleCompleted {
                        order_id: order.id,
                        sale_number: order.sale_number.clone(),
                        payment_method: order.payment_method,
                        total: order.total,
                        timestamp: order.datetime,
                    })
                    .await;
                Ok(order)
            }
            Err(e) => {
                session.committing = false;
                error!("sale recording rejected: {}", e);
                Err(CheckoutError::CommitFailed(e.to_string()))
            }
        }
    }

    /// Parks the order as pending payment instead of completing it.
    ///
    /// Parked orders always record a cash payment method, whatever the
    /// operator had selected.
    #[instrument(skip(self, session), fields(sale_number = %session.sale_number))]
    pub async fn park_pending(
        &self,
        session: &mut CheckoutSession,
    ) -> Result<Order, CheckoutError> {
        if session.closed {
            return Err(CheckoutError::InvalidOperation(
                "Checkout already closed".to_string(),
            ));
        }
        if session.committing {
            return Err(CheckoutError::InvalidOperation(
                "Sale commit in flight".to_string(),
            ));
        }

        let mut order =
            self.build_order(session, OrderStatus::PendingPayment, PaymentMethod::Cash);
        order.amount_paid = Decimal::ZERO;
        order.change = Decimal::ZERO;
        order.mobile_payment_phone = None;

        self.pending_orders.park(order.clone()).await?;
        session.confirmation = None;
        session.closed = true;
        self.events
            .send(Event::OrderParked {
                order_id: order.id,
                total: order.total,
                timestamp: order.datetime,
            })
            .await;
        Ok(order)
    }

    /// Abandons the checkout attempt without producing an order.
    ///
    /// Blocked while a sale commit is in flight; a merely sent, unconfirmed
    /// push is dropped along with its subscription.
    pub async fn close(&self, session: &mut CheckoutSession) -> Result<(), CheckoutError> {
        if session.committing {
            return Err(CheckoutError::InvalidOperation(
                "Sale commit in flight".to_string(),
            ));
        }
        if session.closed {
            return Ok(());
        }
        session.confirmation = None;
        session.closed = true;
        self.events
            .send(Event::CheckoutClosed {
                order_id: session.order_id,
            })
            .await;
        Ok(())
    }

    /// Shareable payment link for this attempt (QR code, copy action).
    pub fn payment_url(&self, session: &CheckoutSession) -> String {
        let customer = session
            .customer
            .as_ref()
            .map(|c| c.id.to_string())
            .unwrap_or_else(|| "guest".to_string());
        format!(
            "{}/payment/{}?amount={}&customer={}",
            self.config.api_endpoint.trim_end_matches('/'),
            session.order_id,
            session.breakdown.total_payable,
            customer
        )
    }

    /// Copies the payment link to the host clipboard and notifies on
    /// success. Host failures are logged and never touch payment state.
    pub async fn copy_payment_link(&self, session: &CheckoutSession) {
        let url = self.payment_url(session);
        if let Err(e) = self.host.write_clipboard(&url).await {
            warn!("clipboard write failed: {}", e);
            return;
        }
        if let Err(e) = self
            .host
            .notify("Copied!", "Payment link copied to clipboard.")
            .await
        {
            warn!("notification failed: {}", e);
        }
    }

    fn build_order(
        &self,
        session: &CheckoutSession,
        status: OrderStatus,
        payment_method: PaymentMethod,
    ) -> Order {
        let (amount_paid, change) = match payment_method {
            PaymentMethod::Cash => (session.cash_received, session.change()),
            _ => (session.breakdown.total_payable, Decimal::ZERO),
        };
        let mobile_payment_phone = (payment_method == PaymentMethod::MobilePayment)
            .then(|| self.phone_profile.normalize(&session.mobile.phone_number));

        Order {
            id: session.order_id,
            order_number: generate_order_number(),
            items: session.cart.clone(),
            customer: session.customer.clone(),
            subtotal: session.breakdown.price_before_tax,
            discount: session.breakdown.discount,
            tax: session.breakdown.tax,
            total: session.breakdown.total_payable,
            order_type: session.order_type,
            table_number: session.table_number.clone(),
            location_id: self.config.location_id,
            datetime: Utc::now(),
            notes: session.notes.clone(),
            status,
            payment_method,
            sale_number: session.sale_number.clone(),
            amount_paid,
            change,
            mobile_payment_phone,
        }
    }
}

/// Human-readable sale reference: prefix, time-derived digits, random
/// suffix. Best-effort uniqueness for display; the order's UUID is the real
/// identity.
fn generate_sale_number() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(6)..];
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| {
            const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
            CHARSET[rng.gen_range(0..CHARSET.len())] as char
        })
        .collect();
    format!("SALE-{}-{}", tail, suffix)
}

fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(8)..];
    format!("ORD-{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_number_shape() {
        let n = generate_sale_number();
        assert!(n.starts_with("SALE-"));
        let parts: Vec<&str> = n.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 6);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn order_number_shape() {
        let n = generate_order_number();
        assert!(n.starts_with("ORD-"));
        assert_eq!(n.len(), "ORD-".len() + 8);
    }
}
