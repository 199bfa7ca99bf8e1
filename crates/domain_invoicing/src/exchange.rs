//! Date-scoped exchange-rate resolution
//!
//! An invoice in a foreign currency carries PLN equivalents computed from a
//! single rate. Resolution policy, in order: local currency needs no rate;
//! a caller-supplied override is used verbatim and flagged custom; otherwise
//! the cached rate for `(currency, issue_date)` applies. A missing cache
//! entry fails generation - the core never falls back to a stale or
//! approximate rate.
//!
//! The cache read itself is an `infra_db` concern; this module only makes
//! the decision given the lookup result.

use chrono::NaiveDate;
use core_kernel::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvoicingError;

/// An exchange rate resolved for a specific invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRate {
    /// Units of PLN per unit of the foreign currency
    pub rate: Decimal,
    /// The date the rate applies to (the invoice issue date)
    pub rate_date: NaiveDate,
    /// True when the rate was supplied by the caller rather than the cache
    pub is_custom: bool,
}

/// Resolves the exchange rate for an invoice
///
/// # Arguments
///
/// * `currency` - The invoice currency (the client's currency)
/// * `issue_date` - The invoice issue date; scopes the cache lookup
/// * `override_rate` - Caller-supplied rate, used verbatim when present
/// * `cached_rate` - Result of the `(currency, issue_date)` cache lookup
///
/// # Returns
///
/// `None` for local-currency invoices; otherwise the resolved rate.
///
/// # Errors
///
/// `Validation` for a non-positive override; `MissingExchangeRate` when the
/// currency is foreign, no override was given, and the cache has no entry.
pub fn resolve_rate(
    currency: Currency,
    issue_date: NaiveDate,
    override_rate: Option<Decimal>,
    cached_rate: Option<Decimal>,
) -> Result<Option<ResolvedRate>, InvoicingError> {
    if currency.is_local() {
        return Ok(None);
    }

    if let Some(rate) = override_rate {
        if rate <= Decimal::ZERO {
            return Err(InvoicingError::validation(format!(
                "custom exchange rate must be positive, got {rate}"
            )));
        }
        return Ok(Some(ResolvedRate {
            rate,
            rate_date: issue_date,
            is_custom: true,
        }));
    }

    match cached_rate {
        Some(rate) => Ok(Some(ResolvedRate {
            rate,
            rate_date: issue_date,
            is_custom: false,
        })),
        None => Err(InvoicingError::MissingExchangeRate {
            currency,
            date: issue_date,
        }),
    }
}
