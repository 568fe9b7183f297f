//! Property-based tests for the checkout core.
//!
//! These use proptest to verify monetary and phone-normalization invariants
//! across a wide range of inputs, catching edge cases unit tests might miss.

use proptest::prelude::*;
use rust_decimal::Decimal;

use pos_checkout::{change_due, profile_for, MonetaryBreakdown};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    // Amounts in cents up to 10 million currency units
    (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn tax_rate_strategy() -> impl Strategy<Value = Decimal> {
    // Fractional rates in [0, 1) with basis-point resolution
    (0i64..10_000).prop_map(|bp| Decimal::new(bp, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn tax_decomposition_sums_exactly(
        (subtotal, discount) in amount_strategy().prop_flat_map(|s| {
            (Just(s), (0..=s.mantissa() as i64).prop_map(|c| Decimal::new(c, 2)))
        }),
        tax_rate in tax_rate_strategy(),
    ) {
        let b = MonetaryBreakdown::compute(subtotal, discount, tax_rate);
        prop_assert_eq!(b.total_payable, subtotal - discount);
        prop_assert_eq!(b.price_before_tax + b.tax, b.total_payable);
        prop_assert!(b.tax >= Decimal::ZERO);
        prop_assert!(b.price_before_tax >= Decimal::ZERO);
    }

    #[test]
    fn change_is_never_negative(
        received in amount_strategy(),
        total in amount_strategy(),
    ) {
        let change = change_due(received, total);
        prop_assert!(change >= Decimal::ZERO);
        if received <= total {
            prop_assert_eq!(change, Decimal::ZERO);
        } else {
            prop_assert_eq!(change, received - total);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn normalization_is_idempotent(input in "[0-9+() \\-]{0,16}") {
        let profile = profile_for("KE");
        let once = profile.normalize(&input);
        prop_assert_eq!(profile.normalize(&once), once);
    }

    #[test]
    fn validation_accepts_exactly_thirteen_character_international_numbers(
        digits in "[0-9]{6,12}",
    ) {
        let profile = profile_for("KE");
        let normalized = profile.normalize(&digits);
        let valid = profile.validate(&digits).is_ok();
        prop_assert_eq!(
            valid,
            normalized.len() == 13 && normalized.starts_with("+254")
        );
    }

    #[test]
    fn local_numbers_gain_the_country_code(subscriber in "[71][0-9]{8}") {
        let profile = profile_for("KE");
        let with_trunk = format!("0{}", subscriber);
        let expected = format!("+254{}", subscriber);
        prop_assert_eq!(profile.normalize(&with_trunk), expected.clone());
        prop_assert_eq!(profile.normalize(&subscriber), expected.clone());
        prop_assert!(profile.validate(&with_trunk).is_ok());
        prop_assert_eq!(profile.validate(&subscriber).unwrap(), expected);
    }
}
