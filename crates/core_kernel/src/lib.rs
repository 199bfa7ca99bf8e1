//! Core Kernel - Foundational types and utilities for the invoicing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic and invoice-grade rounding
//! - Common identifiers and value objects

pub mod money;
pub mod identifiers;
pub mod error;

pub use money::{Money, Currency, VatRate, MoneyError};
pub use identifiers::{
    OwnerId, ClientId, InvoiceId, InvoiceItemId, WorkRecordId,
};
pub use error::CoreError;
