//! POS Checkout Library
//!
//! This crate provides the checkout payment orchestration core for a
//! point-of-sale terminal: tax-inclusive pricing, phone-based mobile payment
//! push with asynchronous confirmation, cash and card tender, and parking of
//! pending orders.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod events;
pub mod host;
pub mod models;
pub mod payment;
pub mod phone;
pub mod pricing;
pub mod services;

pub use config::{init_tracing, load_config, CheckoutConfig};
pub use errors::CheckoutError;
pub use events::{Event, EventSender};
pub use host::{HostBridge, NoopHost};
pub use models::{CartLine, Customer, LoyaltyTier, Order, OrderStatus, OrderType, PaymentMethod};
pub use payment::{
    BroadcastChannel, ConfirmationChannel, HttpPaymentInitiator, MobilePaymentSession,
    MobilePaymentStatus, PaymentInitiator, PaymentOutcome, PaymentStatusMessage, Subscription,
};
pub use phone::{profile_for, PhoneProfile};
pub use pricing::{change_due, CurrencyFormatter, MonetaryBreakdown};
pub use services::{
    CheckoutService, CheckoutSession, InMemoryPendingOrders, PendingOrderStore, SaleRecord,
    SaleRecorder,
};
