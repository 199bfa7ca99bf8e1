//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_invoicing::aggregation::DraftItem;
use domain_invoicing::totals::InvoiceTotals;
use rust_decimal::Decimal;

/// Asserts that two Money values are equal after invoice rounding
///
/// # Panics
///
/// Panics if the currencies differ or the rounded amounts differ
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.round2().amount(),
        expected.round2().amount(),
        "Amounts differ: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that two Money values are approximately equal within a tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts the monetary identity of computed totals
///
/// `gross = round2(net + vat)` must hold exactly, and the local
/// equivalents must either all be present or all be absent.
pub fn assert_totals_consistent(totals: &InvoiceTotals) {
    assert_money_eq(&totals.gross, &(totals.net + totals.vat));

    let locals = [
        totals.net_local.is_some(),
        totals.vat_local.is_some(),
        totals.gross_local.is_some(),
    ];
    assert!(
        locals.iter().all(|present| *present) || locals.iter().all(|present| !present),
        "local equivalents must be all present or all absent: {locals:?}"
    );
}

/// Asserts that item positions are dense and 1-based
pub fn assert_dense_positions(items: &[DraftItem]) {
    for (index, item) in items.iter().enumerate() {
        assert_eq!(
            item.position,
            (index + 1) as u32,
            "item '{}' has position {}, expected {}",
            item.description,
            item.position,
            index + 1
        );
    }
}
