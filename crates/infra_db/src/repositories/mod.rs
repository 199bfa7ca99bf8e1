//! Repository implementations for domain entities
//!
//! This module provides concrete repository implementations that handle
//! database access for each aggregate. Repositories encapsulate SQL queries
//! and map between database rows and domain types.
//!
//! # Architecture
//!
//! Each repository follows these principles:
//! - Owner scoping on every query
//! - Soft-deleted rows excluded from reads, numbering scans, and guards
//! - Optimistic concurrency via constraints and conditional updates, never
//!   via read-check-write alone

pub mod clients;
pub mod exchange_rates;
pub mod work_records;
pub mod invoices;

pub use clients::{ClientRepository, ClientRow};
pub use exchange_rates::ExchangeRateRepository;
pub use work_records::{NewWorkRecord, UpdateWorkRecord, WorkRecordRepository, WorkRecordRow};
pub use invoices::{InvoiceRepository, InvoiceRevision, InvoiceRow, InvoiceItemRow};
