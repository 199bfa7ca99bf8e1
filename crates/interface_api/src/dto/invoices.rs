//! Invoice DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_invoicing::PaymentStatus;
use infra_db::repositories::{InvoiceItemRow, InvoiceRow};

/// Generation request: work-record groupings and/or manual items
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateInvoiceRequest {
    pub client_id: Uuid,
    pub issue_date: NaiveDate,
    pub sale_date: NaiveDate,
    /// Percentage in [0, 100]; range is re-checked by the domain type
    pub vat_rate: Decimal,
    /// Flat selection, grouped by description server-side
    pub time_entry_ids: Option<Vec<Uuid>>,
    /// Explicit grouping instructions; wins over `time_entry_ids`
    #[validate(nested)]
    pub items: Option<Vec<ItemGroupingRequest>>,
    #[validate(nested)]
    pub manual_items: Option<Vec<ManualItemRequest>>,
    pub custom_exchange_rate: Option<Decimal>,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ItemGroupingRequest {
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "a grouping needs at least one time entry"))]
    pub time_entry_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ManualItemRequest {
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Partial edit; absent fields keep their stored values
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInvoiceRequest {
    pub invoice_number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub sale_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub vat_rate: Option<Decimal>,
    /// Full replacement of the item set when present
    #[validate(nested)]
    pub items: Option<Vec<ManualItemRequest>>,
    pub custom_exchange_rate: Option<Decimal>,
    pub notes: Option<String>,
}

/// Paid-status toggle; accepts either form the clients send
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub is_paid: Option<bool>,
    pub status: Option<String>,
}

impl UpdateStatusRequest {
    /// Resolves the two accepted shapes into one status
    pub fn resolve(&self) -> Option<PaymentStatus> {
        if let Some(flag) = self.is_paid {
            return Some(if flag {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Unpaid
            });
        }
        match self.status.as_deref() {
            Some("paid") => Some(PaymentStatus::Paid),
            Some("unpaid") => Some(PaymentStatus::Unpaid),
            _ => None,
        }
    }
}

/// Short confirmation returned by generation
#[derive(Debug, Serialize)]
pub struct GenerateInvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub gross_amount: Decimal,
    pub currency: String,
    pub message: String,
}

/// Condensed row for list views
#[derive(Debug, Serialize)]
pub struct InvoiceSummaryResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: String,
    pub gross_amount: Decimal,
    pub is_manual: bool,
    pub is_paid: bool,
    pub is_edited: bool,
}

impl From<InvoiceRow> for InvoiceSummaryResponse {
    fn from(row: InvoiceRow) -> Self {
        Self {
            id: row.id,
            client_id: row.client_id,
            invoice_number: row.invoice_number,
            issue_date: row.issue_date,
            due_date: row.due_date,
            currency: row.currency,
            gross_amount: row.gross_amount,
            is_manual: row.is_manual,
            is_paid: row.is_paid,
            is_edited: row.is_edited,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceItemResponse {
    pub id: Uuid,
    pub position: i32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub net_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: String,
    pub vat_rate: Decimal,
    pub net_amount: Decimal,
    pub vat_amount: Decimal,
    pub gross_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_amount_local: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_amount_local: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_amount_local: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate_date: Option<NaiveDate>,
    pub rate_is_custom: bool,
    pub amount_in_words: String,
    pub is_manual: bool,
    pub is_paid: bool,
    pub is_edited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<InvoiceItemResponse>,
}

impl InvoiceResponse {
    /// Builds the response from a row and its items
    pub fn from_rows(invoice: InvoiceRow, items: Vec<InvoiceItemRow>) -> Self {
        Self {
            id: invoice.id,
            client_id: invoice.client_id,
            invoice_number: invoice.invoice_number,
            issue_date: invoice.issue_date,
            sale_date: invoice.sale_date,
            due_date: invoice.due_date,
            currency: invoice.currency,
            vat_rate: invoice.vat_rate,
            net_amount: invoice.net_amount,
            vat_amount: invoice.vat_amount,
            gross_amount: invoice.gross_amount,
            net_amount_local: invoice.net_amount_local,
            vat_amount_local: invoice.vat_amount_local,
            gross_amount_local: invoice.gross_amount_local,
            exchange_rate: invoice.exchange_rate,
            exchange_rate_date: invoice.exchange_rate_date,
            rate_is_custom: invoice.rate_is_custom,
            amount_in_words: invoice.amount_in_words,
            is_manual: invoice.is_manual,
            is_paid: invoice.is_paid,
            is_edited: invoice.is_edited,
            edited_at: invoice.edited_at,
            notes: invoice.notes,
            created_at: invoice.created_at,
            items: items
                .into_iter()
                .map(|item| InvoiceItemResponse {
                    id: item.id,
                    position: item.position,
                    description: item.description,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    net_amount: item.net_amount,
                })
                .collect(),
        }
    }
}
