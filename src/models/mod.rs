pub mod cart;
pub mod customer;
pub mod order;

pub use cart::CartLine;
pub use customer::{Customer, LoyaltyTier};
pub use order::{Order, OrderStatus, OrderType, PaymentMethod};
