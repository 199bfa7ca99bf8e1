//! Invoicing domain errors
//!
//! The taxonomy mirrors how failures surface to callers: validation problems
//! caught before any store access, missing entities, optimistic-concurrency
//! conflicts, billing locks, a missing exchange rate, and write failures
//! that have already been compensated.

use chrono::NaiveDate;
use core_kernel::{Currency, MoneyError};
use thiserror::Error;

/// Errors that can occur in the invoicing domain
#[derive(Debug, Error)]
pub enum InvoicingError {
    /// Malformed or missing input, detected before any store access
    #[error("Validation error: {0}")]
    Validation(String),

    /// Client, invoice, or work record absent or not owned by the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate invoice number or a work record claimed by a concurrent request
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Work record is billed by a non-deleted invoice and cannot be modified
    #[error("Record is locked by invoice {invoice_number}")]
    Locked { invoice_number: String },

    /// No cached exchange rate for the required currency and date
    #[error("No exchange rate for {currency} on {date}; supply a manual rate")]
    MissingExchangeRate { currency: Currency, date: NaiveDate },

    /// A store operation failed after validation passed; compensation has run
    #[error("Write failed: {0}")]
    Write(String),

    /// Monetary computation error
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl InvoicingError {
    pub fn validation(message: impl Into<String>) -> Self {
        InvoicingError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        InvoicingError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        InvoicingError::Conflict(message.into())
    }

    pub fn write(message: impl Into<String>) -> Self {
        InvoicingError::Write(message.into())
    }

    /// Machine-readable code for API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            InvoicingError::Validation(_) => "validation_error",
            InvoicingError::NotFound(_) => "not_found",
            InvoicingError::Conflict(_) => "conflict",
            InvoicingError::Locked { .. } => "record_locked",
            InvoicingError::MissingExchangeRate { .. } => "missing_exchange_rate",
            InvoicingError::Write(_) => "write_failed",
            InvoicingError::Money(_) => "validation_error",
        }
    }
}
