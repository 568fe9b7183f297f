use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use super::{CartLine, Customer};

/// Payment method selected at the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    MobilePayment,
    Cash,
    CreditCard,
}

/// Terminal status of an order produced by checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    Completed,
    PendingPayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum OrderType {
    #[serde(rename = "Dine in")]
    #[strum(serialize = "Dine in")]
    DineIn,
    #[serde(rename = "Take away")]
    #[strum(serialize = "Take away")]
    TakeAway,
    #[serde(rename = "Delivery")]
    Delivery,
}

/// The commit artifact of a checkout attempt.
///
/// Built exactly once per commit or park action; this crate never mutates an
/// order after it is created. Monetary fields are tax-exclusive in `subtotal`
/// (the back-calculated pre-tax price) with `total` carrying the tax-inclusive
/// amount the customer pays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub items: Vec<CartLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<Uuid>,
    pub datetime: DateTime<Utc>,
    pub notes: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub sale_number: String,
    pub amount_paid: Decimal,
    pub change: Decimal,
    /// Normalized phone the push was sent to, mobile payments only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_payment_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::MobilePayment).unwrap(),
            "\"MOBILE_PAYMENT\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"CREDIT_CARD\""
        );
    }

    #[test]
    fn order_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PendingPayment).unwrap(),
            "\"pending-payment\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn order_type_display_matches_terminal_labels() {
        assert_eq!(OrderType::DineIn.to_string(), "Dine in");
        assert_eq!(OrderType::TakeAway.to_string(), "Take away");
    }
}
