//! Work-record repository
//!
//! Work records feed invoice generation and are locked for the lifetime of
//! the invoice that bills them. The lock is enforced here with conditional
//! SQL - an update or soft delete only succeeds when no non-deleted invoice
//! references the record - so that a stale in-memory check can never let a
//! billed record slip through.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{classify, DatabaseError};

/// Database row for a work record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkRecordRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub work_date: NaiveDate,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    pub currency: String,
    pub description: String,
    pub private_note: Option<String>,
    pub invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Data for creating a new work record
#[derive(Debug, Clone)]
pub struct NewWorkRecord {
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub work_date: NaiveDate,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    pub currency: String,
    pub description: String,
    pub private_note: Option<String>,
}

/// Partial update of a work record; `None` fields keep their value
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkRecord {
    pub work_date: Option<NaiveDate>,
    pub hours: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub description: Option<String>,
    pub private_note: Option<String>,
}

const RECORD_COLUMNS: &str = "id, owner_id, client_id, work_date, hours, hourly_rate, currency, \
     description, private_note, invoice_id, created_at, deleted_at";

/// Repository for work records and their billing locks
#[derive(Debug, Clone)]
pub struct WorkRecordRepository {
    pool: PgPool,
}

impl WorkRecordRepository {
    /// Creates a new WorkRecordRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new, unbilled work record
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id, client_id = %input.client_id))]
    pub async fn create(&self, input: &NewWorkRecord) -> Result<WorkRecordRow, DatabaseError> {
        let row = sqlx::query_as::<_, WorkRecordRow>(&format!(
            r#"
            INSERT INTO work_records (
                id, owner_id, client_id, work_date, hours, hourly_rate,
                currency, description, private_note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.owner_id)
        .bind(input.client_id)
        .bind(input.work_date)
        .bind(input.hours)
        .bind(input.hourly_rate)
        .bind(&input.currency)
        .bind(&input.description)
        .bind(&input.private_note)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        info!(record_id = %row.id, "Work record created");
        Ok(row)
    }

    /// Lists the owner's non-deleted work records, optionally only unbilled
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list(
        &self,
        owner_id: Uuid,
        unbilled_only: bool,
    ) -> Result<Vec<WorkRecordRow>, DatabaseError> {
        sqlx::query_as::<_, WorkRecordRow>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM work_records
            WHERE owner_id = $1
              AND deleted_at IS NULL
              AND ($2::bool = FALSE OR invoice_id IS NULL)
            ORDER BY work_date DESC, created_at DESC
            "#
        ))
        .bind(owner_id)
        .bind(unbilled_only)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    /// Fetches a non-deleted work record owned by the caller
    #[instrument(skip(self), fields(owner_id = %owner_id, record_id = %record_id))]
    pub async fn find_owned(
        &self,
        owner_id: Uuid,
        record_id: Uuid,
    ) -> Result<Option<WorkRecordRow>, DatabaseError> {
        sqlx::query_as::<_, WorkRecordRow>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM work_records
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#
        ))
        .bind(record_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    /// Fetches the records a generation request wants to bill
    ///
    /// Filters to the owner, the client, and `invoice_id IS NULL`; the
    /// writer compares the returned count against the requested count to
    /// rule out partial billing.
    #[instrument(skip(self, record_ids), fields(owner_id = %owner_id, client_id = %client_id, requested = record_ids.len()))]
    pub async fn fetch_billable(
        &self,
        owner_id: Uuid,
        client_id: Uuid,
        record_ids: &[Uuid],
    ) -> Result<Vec<WorkRecordRow>, DatabaseError> {
        sqlx::query_as::<_, WorkRecordRow>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM work_records
            WHERE id = ANY($1)
              AND owner_id = $2
              AND client_id = $3
              AND invoice_id IS NULL
              AND deleted_at IS NULL
            "#
        ))
        .bind(record_ids)
        .bind(owner_id)
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    /// Returns the number of the non-deleted invoice locking a record
    ///
    /// `None` means the record is unbilled (or only referenced by a deleted
    /// invoice, which does not lock).
    #[instrument(skip(self), fields(record_id = %record_id))]
    pub async fn locking_invoice_number(
        &self,
        record_id: Uuid,
    ) -> Result<Option<String>, DatabaseError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT i.invoice_number
            FROM work_records w
            JOIN invoices i ON i.id = w.invoice_id
            WHERE w.id = $1 AND i.deleted_at IS NULL
            "#,
        )
        .bind(record_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    /// Updates an unbilled work record
    ///
    /// The update carries the lock guard in its WHERE clause: it only
    /// succeeds when no non-deleted invoice references the record. Returns
    /// `None` when the row was missing, deleted, or locked - the caller
    /// distinguishes by re-checking [`Self::locking_invoice_number`].
    #[instrument(skip(self, input), fields(owner_id = %owner_id, record_id = %record_id))]
    pub async fn update_unbilled(
        &self,
        owner_id: Uuid,
        record_id: Uuid,
        input: &UpdateWorkRecord,
    ) -> Result<Option<WorkRecordRow>, DatabaseError> {
        sqlx::query_as::<_, WorkRecordRow>(&format!(
            r#"
            UPDATE work_records
            SET work_date = COALESCE($3, work_date),
                hours = COALESCE($4, hours),
                hourly_rate = COALESCE($5, hourly_rate),
                description = COALESCE($6, description),
                private_note = COALESCE($7, private_note)
            WHERE id = $1
              AND owner_id = $2
              AND deleted_at IS NULL
              AND NOT EXISTS (
                  SELECT 1 FROM invoices i
                  WHERE i.id = work_records.invoice_id AND i.deleted_at IS NULL
              )
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(record_id)
        .bind(owner_id)
        .bind(input.work_date)
        .bind(input.hours)
        .bind(input.hourly_rate)
        .bind(&input.description)
        .bind(&input.private_note)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    /// Soft-deletes an unbilled work record
    ///
    /// Same lock guard as [`Self::update_unbilled`]; returns false when
    /// nothing was deleted.
    #[instrument(skip(self), fields(owner_id = %owner_id, record_id = %record_id))]
    pub async fn delete_unbilled(
        &self,
        owner_id: Uuid,
        record_id: Uuid,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE work_records
            SET deleted_at = NOW()
            WHERE id = $1
              AND owner_id = $2
              AND deleted_at IS NULL
              AND NOT EXISTS (
                  SELECT 1 FROM invoices i
                  WHERE i.id = work_records.invoice_id AND i.deleted_at IS NULL
              )
            "#,
        )
        .bind(record_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(record_id = %record_id, "Work record deleted");
        }
        Ok(deleted)
    }
}
