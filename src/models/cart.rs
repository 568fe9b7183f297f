use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of the cart being checked out.
///
/// Immutable once handed to checkout; quantity is validated upstream by the
/// cart editor and is always at least 1 here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addition: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let line = CartLine {
            product_id: Uuid::new_v4(),
            name: "Americano".into(),
            variant_id: None,
            variant: Some("Large".into()),
            addition: None,
            unit_price: dec!(250.00),
            quantity: 3,
        };
        assert_eq!(line.line_total(), dec!(750.00));
    }
}
