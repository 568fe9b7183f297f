pub mod checkout;
pub mod orders;

pub use checkout::{CheckoutService, CheckoutSession};
pub use orders::{InMemoryPendingOrders, PendingOrderStore, SaleRecord, SaleRecorder};
