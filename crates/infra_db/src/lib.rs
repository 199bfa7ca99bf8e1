//! Infrastructure Database Layer
//!
//! This crate provides the database infrastructure for the invoicing core,
//! implemented on PostgreSQL using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern, providing data access
//! abstractions that hide the database implementation details from the
//! domain layer. Repositories use the runtime query API so the crate builds
//! without a live database.
//!
//! # Write discipline
//!
//! The store exposes no multi-table transaction to this code path, so the
//! invoice writer runs a forward-only saga with explicit, individually
//! logged compensations. Two constraints carry the concurrency story:
//! the partial unique index on `(owner_id, invoice_number)` (numbering
//! races resolve by retry) and the conditional `invoice_id IS NULL` update
//! on work records (double billing resolves to a conflict).
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, InvoiceRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/invoicing")).await?;
//! let invoices = InvoiceRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::{
    ClientRepository, ExchangeRateRepository, InvoiceRepository, WorkRecordRepository,
};
