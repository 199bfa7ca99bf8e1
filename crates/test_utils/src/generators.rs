//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::{Currency, Money, VatRate};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::PLN),
        Just(Currency::EUR),
        Just(Currency::USD),
        Just(Currency::GBP),
        Just(Currency::CHF),
    ]
}

/// Strategy for generating foreign (non-PLN) currencies
pub fn foreign_currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::EUR),
        Just(Currency::USD),
        Just(Currency::GBP),
        Just(Currency::CHF),
    ]
}

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating valid Money values with positive amounts
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating PLN Money values
pub fn pln_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::PLN))
}

/// Strategy for generating valid VAT rates (whole percentages 0-100)
pub fn vat_rate_strategy() -> impl Strategy<Value = VatRate> {
    (0u32..=100u32).prop_map(|pct| {
        VatRate::from_percentage(Decimal::from(pct)).expect("percentage is within range")
    })
}

/// Strategy for generating positive exchange rates around realistic values
pub fn exchange_rate_strategy() -> impl Strategy<Value = Decimal> {
    (1_0000i64..10_0000i64).prop_map(|scaled| Decimal::new(scaled, 4))
}

/// Strategy for generating hour quantities (0.25 .. 16.00 in quarter steps)
pub fn hours_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=64i64).prop_map(|quarters| Decimal::new(quarters * 25, 2))
}

/// Strategy for generating sets of taken sequence numbers
pub fn sequence_set_strategy() -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(1u32..300u32, 0..60)
}
