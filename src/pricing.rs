use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived monetary figures for one checkout attempt.
///
/// Totals are tax-inclusive: the customer-facing total already contains tax,
/// and the pre-tax price and tax amount are back-calculated from it rather
/// than added forward. With `Decimal` arithmetic the decomposition is exact:
/// `price_before_tax + tax == total_payable` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonetaryBreakdown {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total_payable: Decimal,
    pub tax_rate: Decimal,
    pub price_before_tax: Decimal,
    pub tax: Decimal,
}

impl MonetaryBreakdown {
    /// Computes the breakdown from cart subtotal, discount and a fractional
    /// tax rate (e.g. 0.16). `discount <= subtotal` is the caller's
    /// responsibility; this function does not enforce it.
    pub fn compute(subtotal: Decimal, discount: Decimal, tax_rate: Decimal) -> Self {
        let total_payable = subtotal - discount;
        let price_before_tax = total_payable / (Decimal::ONE + tax_rate);
        let tax = total_payable - price_before_tax;
        Self {
            subtotal,
            discount,
            total_payable,
            tax_rate,
            price_before_tax,
            tax,
        }
    }
}

/// Change owed on a cash tender; never negative.
pub fn change_due(amount_received: Decimal, total_payable: Decimal) -> Decimal {
    (amount_received - total_payable).max(Decimal::ZERO)
}

/// Pure display formatting for monetary amounts.
///
/// Rounds for presentation only; stored values keep full precision.
#[derive(Debug, Clone)]
pub struct CurrencyFormatter {
    currency_code: String,
    #[allow(dead_code)]
    locale: String,
}

impl CurrencyFormatter {
    pub fn new(currency_code: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            currency_code: currency_code.into(),
            locale: locale.into(),
        }
    }

    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp(2);
        let negative = rounded.is_sign_negative();
        let unsigned = rounded.abs();
        let text = format!("{:.2}", unsigned);
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text.as_str(), "00"),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if negative { "-" } else { "" };
        format!("{} {}{}.{}", self.currency_code, sign, grouped, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tax_decomposition_is_exact() {
        let b = MonetaryBreakdown::compute(dec!(1000), dec!(0), dec!(0.16));
        assert_eq!(b.total_payable, dec!(1000));
        assert_eq!(b.price_before_tax + b.tax, b.total_payable);
        assert!(b.tax >= Decimal::ZERO);
    }

    #[test]
    fn zero_tax_rate_leaves_total_untaxed() {
        let b = MonetaryBreakdown::compute(dec!(450), dec!(50), Decimal::ZERO);
        assert_eq!(b.total_payable, dec!(400));
        assert_eq!(b.price_before_tax, dec!(400));
        assert_eq!(b.tax, Decimal::ZERO);
    }

    #[test]
    fn change_is_never_negative() {
        assert_eq!(change_due(dec!(900), dec!(1000)), Decimal::ZERO);
        assert_eq!(change_due(dec!(1000), dec!(1000)), Decimal::ZERO);
        assert_eq!(change_due(dec!(1200), dec!(1000)), dec!(200));
    }

    #[test]
    fn formatting_groups_thousands_and_rounds_for_display() {
        let fmt = CurrencyFormatter::new("KES", "en-KE");
        assert_eq!(fmt.format(dec!(1234567.891)), "KES 1,234,567.89");
        assert_eq!(fmt.format(dec!(400)), "KES 400.00");
        assert_eq!(fmt.format(dec!(-15.5)), "KES -15.50");
    }

    #[test]
    fn formatting_does_not_mutate_stored_precision() {
        let b = MonetaryBreakdown::compute(dec!(100), dec!(0), dec!(0.16));
        let fmt = CurrencyFormatter::new("KES", "en-KE");
        let _ = fmt.format(b.price_before_tax);
        // The breakdown still sums exactly after display rounding elsewhere.
        assert_eq!(b.price_before_tax + b.tax, b.total_payable);
    }
}
