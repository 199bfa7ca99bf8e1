//! Work records and the billing-lock state machine
//!
//! A work record transitions `Unbilled -> Billed` as a side effect of
//! invoice generation and back to `Unbilled` only when the owning invoice
//! is soft-deleted or its reference is cleared. While billed, the record is
//! immutable: edits and deletes are rejected with a locked error.
//!
//! The transitions here are the in-memory contract; `infra_db` enforces the
//! same rules at the store with conditional updates so that two concurrent
//! generations cannot both claim a record.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{ClientId, Currency, InvoiceId, OwnerId, WorkRecordId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregation::BillableRecord;
use crate::error::InvoicingError;

/// Billing state of a work record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingState {
    /// Free to edit, delete, or bill
    Unbilled,
    /// Referenced by a non-deleted invoice; immutable until released
    Billed { invoice_id: InvoiceId },
}

impl BillingState {
    pub fn is_billed(&self) -> bool {
        matches!(self, BillingState::Billed { .. })
    }
}

/// A dated, priced unit of billable time tracked against a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecord {
    pub id: WorkRecordId,
    pub owner_id: OwnerId,
    pub client_id: ClientId,
    pub work_date: NaiveDate,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    pub currency: Currency,
    /// Shown on the invoice item
    pub description: String,
    /// Never leaves the owner's account
    pub private_note: Option<String>,
    pub billing: BillingState,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl WorkRecord {
    /// Returns true when the record is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Rejects modification of a billed record
    ///
    /// # Arguments
    ///
    /// * `invoice_number` - Number of the owning invoice, for the error message
    pub fn ensure_unlocked(&self, invoice_number: &str) -> Result<(), InvoicingError> {
        match self.billing {
            BillingState::Unbilled => Ok(()),
            BillingState::Billed { .. } => Err(InvoicingError::Locked {
                invoice_number: invoice_number.to_string(),
            }),
        }
    }

    /// Marks the record as billed by an invoice
    ///
    /// # Errors
    ///
    /// `Conflict` when the record is already billed - the double-billing
    /// guard; the store-level equivalent is the conditional
    /// `invoice_id IS NULL` update.
    pub fn bill(&mut self, invoice_id: InvoiceId) -> Result<(), InvoicingError> {
        match self.billing {
            BillingState::Unbilled => {
                self.billing = BillingState::Billed { invoice_id };
                Ok(())
            }
            BillingState::Billed { invoice_id: existing } => Err(InvoicingError::conflict(
                format!("work record {} is already billed by invoice {existing}", self.id),
            )),
        }
    }

    /// Clears the invoice reference, returning the record to `Unbilled`
    ///
    /// Idempotent: releasing an unbilled record is a no-op, matching the
    /// store-level `SET invoice_id = NULL WHERE invoice_id = $1` update.
    pub fn release(&mut self) {
        self.billing = BillingState::Unbilled;
    }

    /// Reduces the record to what aggregation needs
    pub fn to_billable(&self) -> BillableRecord {
        BillableRecord {
            id: self.id,
            description: self.description.clone(),
            hours: self.hours,
            hourly_rate: self.hourly_rate,
        }
    }
}
