//! Invoicing Domain - invoice generation core
//!
//! This crate implements the pure domain logic behind invoice generation:
//! gap-filling invoice numbering, work-record aggregation into line items,
//! net/VAT/gross computation with invoice-grade rounding, date-scoped
//! exchange-rate resolution, the Polish amount-in-words renderer, and the
//! billed/unbilled state machine that locks work records to invoices.
//!
//! Everything here is side-effect free. Persistence - including the
//! forward-only write saga and the conditional updates that make numbering
//! and billing safe under concurrency - lives in `infra_db`.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_invoicing::{aggregation, totals, numbering};
//!
//! let items = aggregation::aggregate(&groupings, &records, &manual)?;
//! let totals = totals::compute_totals(&items, currency, vat_rate, rate.as_ref());
//! let number = numbering::allocate(scope, &existing_numbers);
//! ```

pub mod numbering;
pub mod exchange;
pub mod aggregation;
pub mod totals;
pub mod words;
pub mod invoice;
pub mod work_record;
pub mod error;

pub use numbering::{NumberScope, allocate, first_free_sequence, format_invoice_number, parse_sequence};
pub use exchange::{ResolvedRate, resolve_rate};
pub use aggregation::{BillableRecord, ItemGrouping, ManualItem, DraftItem, aggregate, group_by_description};
pub use totals::{InvoiceTotals, compute_totals};
pub use words::amount_in_words;
pub use invoice::{InvoiceDraft, PaymentStatus, default_due_date};
pub use work_record::{BillingState, WorkRecord};
pub use error::InvoicingError;
