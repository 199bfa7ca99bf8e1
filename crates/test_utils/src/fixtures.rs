//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the
//! invoicing system. These fixtures are designed to be consistent and
//! predictable for unit tests.

use chrono::NaiveDate;
use core_kernel::{ClientId, Currency, Money, OwnerId, VatRate, WorkRecordId};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard PLN amount
    pub fn pln_100() -> Money {
        Money::new(dec!(100.00), Currency::PLN)
    }

    /// The gross amount of the canonical two-record scenario
    pub fn pln_gross_2583() -> Money {
        Money::new(dec!(2583.00), Currency::PLN)
    }

    /// A fractional net amount that makes rounding visible
    pub fn pln_fractional() -> Money {
        Money::new(dec!(100.55), Currency::PLN)
    }

    /// A EUR amount for foreign-currency tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }

    /// A zero amount
    pub fn pln_zero() -> Money {
        Money::zero(Currency::PLN)
    }
}

/// Fixture for VAT rates
pub struct VatFixtures;

impl VatFixtures {
    /// The standard Polish rate
    pub fn standard() -> VatRate {
        VatRate::standard()
    }

    /// The reduced 8% rate
    pub fn reduced() -> VatRate {
        VatRate::from_percentage(dec!(8)).expect("8 is a valid rate")
    }
}

/// Fixture for business dates
pub struct DateFixtures;

impl DateFixtures {
    /// A fixed issue date in August 2026
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).expect("valid date")
    }

    /// A sale date a week before the issue date
    pub fn sale_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 31).expect("valid date")
    }

    /// A work date inside the billed period
    pub fn work_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 15).expect("valid date")
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn owner_id() -> OwnerId {
        OwnerId::new()
    }

    pub fn client_id() -> ClientId {
        ClientId::new()
    }

    pub fn work_record_id() -> WorkRecordId {
        WorkRecordId::new()
    }
}

/// Fixture for strings
pub struct StringFixtures;

impl StringFixtures {
    /// A typical invoice-item description
    pub fn description() -> &'static str {
        "Prace programistyczne"
    }

    /// A well-formed invoice number in the August 2026 scope
    pub fn invoice_number() -> &'static str {
        "FV/2026/08/001"
    }
}
