//! Work record DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use infra_db::repositories::WorkRecordRow;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkRecordRequest {
    pub client_id: Uuid,
    pub work_date: NaiveDate,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub private_note: Option<String>,
}

/// Partial update; absent fields keep their stored values
#[derive(Debug, Deserialize, Default)]
pub struct UpdateWorkRecordRequest {
    pub work_date: Option<NaiveDate>,
    pub hours: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub description: Option<String>,
    pub private_note: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListWorkRecordsQuery {
    /// When true, only records available for billing are returned
    #[serde(default)]
    pub unbilled: bool,
}

#[derive(Debug, Serialize)]
pub struct WorkRecordResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub work_date: NaiveDate,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    pub currency: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<Uuid>,
    pub is_billed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<WorkRecordRow> for WorkRecordResponse {
    fn from(row: WorkRecordRow) -> Self {
        Self {
            id: row.id,
            client_id: row.client_id,
            work_date: row.work_date,
            hours: row.hours,
            hourly_rate: row.hourly_rate,
            currency: row.currency,
            description: row.description,
            private_note: row.private_note,
            invoice_id: row.invoice_id,
            is_billed: row.invoice_id.is_some(),
            created_at: row.created_at,
        }
    }
}
