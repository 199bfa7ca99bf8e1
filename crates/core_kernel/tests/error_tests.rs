//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_invalid_state() {
    let error = CoreError::invalid_state("Cannot unlock a record without an invoice");

    match error {
        CoreError::InvalidStateTransition(msg) => assert!(msg.contains("Cannot unlock")),
        _ => panic!("Expected InvalidStateTransition error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Invoice not found");

    match error {
        CoreError::NotFound(msg) => assert_eq!(msg, "Invoice not found"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::CurrencyMismatch("PLN".to_string(), "EUR".to_string());
    let core_error: CoreError = money_error.into();

    match core_error {
        CoreError::Money(MoneyError::CurrencyMismatch(a, b)) => {
            assert_eq!(a, "PLN");
            assert_eq!(b, "EUR");
        }
        _ => panic!("Expected Money error"),
    }
}

#[test]
fn test_error_display_messages() {
    let error = CoreError::validation("vat_rate out of range");
    assert!(error.to_string().contains("vat_rate out of range"));

    let error = CoreError::not_found("Client missing");
    assert!(error.to_string().contains("Client missing"));
}
