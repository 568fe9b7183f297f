pub mod channel;
pub mod initiator;
pub mod session;

pub use channel::{BroadcastChannel, ConfirmationChannel, PaymentOutcome, PaymentStatusMessage, Subscription};
pub use initiator::{HttpPaymentInitiator, PaymentInitiator};
pub use session::{MobilePaymentSession, MobilePaymentStatus};
