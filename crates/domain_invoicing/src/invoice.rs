//! Invoice assembly
//!
//! An [`InvoiceDraft`] is the fully validated, fully computed invoice ready
//! for persistence: items aggregated, totals and words rendered, exchange
//! rate resolved. The writer in `infra_db` takes a draft, allocates a
//! number under the uniqueness constraint, and runs the multi-record write.

use chrono::{Days, NaiveDate};
use core_kernel::{ClientId, Currency, OwnerId, VatRate};
use serde::{Deserialize, Serialize};

use crate::aggregation::DraftItem;
use crate::error::InvoicingError;
use crate::exchange::ResolvedRate;
use crate::totals::{compute_totals, InvoiceTotals};

/// Payment terms applied when the caller does not pick a due date
const DEFAULT_PAYMENT_TERM_DAYS: u64 = 14;

/// Returns the default due date for an issue date
pub fn default_due_date(issue_date: NaiveDate) -> NaiveDate {
    issue_date
        .checked_add_days(Days::new(DEFAULT_PAYMENT_TERM_DAYS))
        .unwrap_or(issue_date)
}

/// Payment status of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

/// A validated invoice ready to be written
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub owner_id: OwnerId,
    pub client_id: ClientId,
    pub currency: Currency,
    pub issue_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub due_date: NaiveDate,
    pub vat_rate: VatRate,
    pub items: Vec<DraftItem>,
    pub totals: InvoiceTotals,
    pub exchange: Option<ResolvedRate>,
    /// True when no work records were consumed
    pub is_manual: bool,
    pub notes: Option<String>,
}

impl InvoiceDraft {
    /// Assembles a draft from aggregated items and a resolved rate
    ///
    /// Computes totals, derives the manual flag from the absence of
    /// work-record links, and applies the default payment term when no due
    /// date was supplied.
    ///
    /// # Errors
    ///
    /// `Validation` when the item list is empty or the sale date precedes
    /// nothing sensible (sale after issue is allowed; the wizard offers
    /// both orders).
    pub fn assemble(
        owner_id: OwnerId,
        client_id: ClientId,
        currency: Currency,
        issue_date: NaiveDate,
        sale_date: NaiveDate,
        due_date: Option<NaiveDate>,
        vat_rate: VatRate,
        items: Vec<DraftItem>,
        exchange: Option<ResolvedRate>,
        notes: Option<String>,
    ) -> Result<Self, InvoicingError> {
        if items.is_empty() {
            return Err(InvoicingError::validation(
                "an invoice needs at least one item",
            ));
        }

        let totals = compute_totals(&items, currency, vat_rate, exchange.as_ref());
        let is_manual = items.iter().all(|item| item.record_ids.is_empty());

        Ok(Self {
            owner_id,
            client_id,
            currency,
            issue_date,
            sale_date,
            due_date: due_date.unwrap_or_else(|| default_due_date(issue_date)),
            vat_rate,
            items,
            totals,
            exchange,
            is_manual,
            notes,
        })
    }

    /// Ids of every work record this invoice consumes
    pub fn consumed_record_ids(&self) -> Vec<core_kernel::WorkRecordId> {
        self.items
            .iter()
            .flat_map(|item| item.record_ids.iter().copied())
            .collect()
    }
}
