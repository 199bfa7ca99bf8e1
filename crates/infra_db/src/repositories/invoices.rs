//! Invoice repository and the generation write saga
//!
//! The store exposes no multi-table transaction to this code path, so
//! generation runs as a forward-only saga: client check, unbilled re-check,
//! invoice insert (with number-conflict retry), item inserts, link inserts,
//! then the conditional work-record claim. Every step after the invoice
//! insert compensates by releasing claimed records and deleting the invoice
//! row; a failed compensation is logged and never masks the original error.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use domain_invoicing::aggregation::DraftItem;
use domain_invoicing::exchange::ResolvedRate;
use domain_invoicing::invoice::InvoiceDraft;
use domain_invoicing::numbering::{self, NumberScope};
use domain_invoicing::totals::InvoiceTotals;
use domain_invoicing::InvoicingError;

use crate::error::{classify, DatabaseError};

/// Attempts to win the numbering race before giving up
const MAX_NUMBER_ATTEMPTS: u32 = 3;

/// Database row for an invoice
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub owner_id: Uuid,
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
    pub net_amount_local: Option<Decimal>,
    pub vat_amount_local: Option<Decimal>,
    pub gross_amount_local: Option<Decimal>,
    pub exchange_rate: Option<Decimal>,
    pub exchange_rate_date: Option<NaiveDate>,
    pub rate_is_custom: bool,
    pub amount_in_words: String,
    pub is_manual: bool,
    pub is_paid: bool,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Database row for an invoice item
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceItemRow {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub position: i32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub net_amount: Decimal,
}

/// Full replacement state for an invoice edit
///
/// The handler merges the partial request into the stored invoice,
/// re-aggregates items, and recomputes totals before calling the
/// repository; the repository applies the new state wholesale.
#[derive(Debug, Clone)]
pub struct InvoiceRevision {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub due_date: NaiveDate,
    pub vat_rate: Decimal,
    pub items: Vec<DraftItem>,
    pub totals: InvoiceTotals,
    pub exchange: Option<ResolvedRate>,
    pub notes: Option<String>,
}

const INVOICE_COLUMNS: &str = "id, owner_id, client_id, invoice_number, issue_date, sale_date, \
     due_date, currency, vat_rate, net_amount, vat_amount, gross_amount, net_amount_local, \
     vat_amount_local, gross_amount_local, exchange_rate, exchange_rate_date, rate_is_custom, \
     amount_in_words, is_manual, is_paid, is_edited, edited_at, notes, created_at, deleted_at";

const ITEM_COLUMNS: &str = "id, invoice_id, position, description, quantity, unit_price, net_amount";

/// Repository for invoices, their items, and the generation saga
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // -------------------------------------------------------------------------
    // Generation saga
    // -------------------------------------------------------------------------

    /// Writes a fully assembled invoice draft
    ///
    /// Steps, each guarded by the one before succeeding:
    /// 1. the client must exist, be owned by the caller, and not be deleted;
    /// 2. every consumed work record must still be unbilled - no partial
    ///    billing;
    /// 3. the invoice row is inserted under the unique number index,
    ///    re-allocating on a duplicate up to [`MAX_NUMBER_ATTEMPTS`] times;
    /// 4. item rows are inserted;
    /// 5. item-to-work-record links are inserted;
    /// 6. consumed records are claimed with a conditional update that only
    ///    touches rows whose `invoice_id` is still NULL.
    ///
    /// Failure in steps 4-6 triggers the compensating delete before the
    /// error is surfaced; a short claim in step 6 is a conflict, not a
    /// partial success.
    #[instrument(skip(self, draft), fields(owner_id = %draft.owner_id, client_id = %draft.client_id))]
    pub async fn generate(&self, draft: &InvoiceDraft) -> Result<InvoiceRow, InvoicingError> {
        let owner_id: Uuid = draft.owner_id.into();
        let client_id: Uuid = draft.client_id.into();
        let record_ids: Vec<Uuid> = draft
            .consumed_record_ids()
            .into_iter()
            .map(Uuid::from)
            .collect();

        // Step 1: client ownership
        let client_exists = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM clients WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL",
        )
        .bind(client_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(classify(e)))?;

        if client_exists.is_none() {
            return Err(InvoicingError::not_found("client not found"));
        }

        // Step 2: every requested record must still be unbilled
        if !record_ids.is_empty() {
            let unbilled: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*)
                FROM work_records
                WHERE id = ANY($1)
                  AND owner_id = $2
                  AND client_id = $3
                  AND invoice_id IS NULL
                  AND deleted_at IS NULL
                "#,
            )
            .bind(&record_ids)
            .bind(owner_id)
            .bind(client_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error(classify(e)))?;

            if unbilled != record_ids.len() as i64 {
                return Err(InvoicingError::conflict(
                    "some selected work records are no longer unbilled",
                ));
            }
        }

        // Step 3: allocate a number and insert, retrying lost races
        let invoice = self.insert_with_number_retry(draft, owner_id, client_id).await?;

        // Step 4: items
        let mut item_ids = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            match self.insert_item(invoice.id, item).await {
                Ok(item_id) => item_ids.push(item_id),
                Err(e) => {
                    self.compensate(invoice.id, "item insert failed").await;
                    return Err(InvoicingError::write(format!(
                        "failed to write invoice item '{}': {e}",
                        item.description
                    )));
                }
            }
        }

        // Step 5: item-to-work-record links
        for (item_id, item) in item_ids.iter().zip(&draft.items) {
            for record_id in &item.record_ids {
                let result = sqlx::query(
                    "INSERT INTO invoice_item_work_records (item_id, work_record_id) VALUES ($1, $2)",
                )
                .bind(item_id)
                .bind(Uuid::from(*record_id))
                .execute(&self.pool)
                .await;

                if let Err(e) = result {
                    self.compensate(invoice.id, "link insert failed").await;
                    return Err(InvoicingError::write(format!(
                        "failed to link work record {record_id}: {e}"
                    )));
                }
            }
        }

        // Step 6: claim the records, only where still unclaimed
        if !record_ids.is_empty() {
            match self.claim_records(&record_ids, owner_id, invoice.id).await {
                Ok(claimed) if claimed == record_ids.len() as u64 => {}
                Ok(claimed) => {
                    warn!(
                        claimed,
                        requested = record_ids.len(),
                        "concurrent generation claimed an overlapping work record"
                    );
                    self.compensate(invoice.id, "short work-record claim").await;
                    return Err(InvoicingError::conflict(
                        "a selected work record was billed by a concurrent request",
                    ));
                }
                Err(e) => {
                    self.compensate(invoice.id, "work-record claim failed").await;
                    return Err(InvoicingError::write(format!(
                        "failed to mark work records as billed: {e}"
                    )));
                }
            }
        }

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            gross = %invoice.gross_amount,
            "Invoice generated"
        );
        Ok(invoice)
    }

    /// Inserts the invoice row, re-allocating the number on each lost race
    async fn insert_with_number_retry(
        &self,
        draft: &InvoiceDraft,
        owner_id: Uuid,
        client_id: Uuid,
    ) -> Result<InvoiceRow, InvoicingError> {
        let scope = NumberScope::from_issue_date(draft.issue_date);

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let existing = self.existing_numbers(owner_id, scope).await.map_err(db_error)?;
            let number = numbering::allocate(scope, &existing);

            match self.insert_invoice(draft, owner_id, client_id, &number).await {
                Ok(row) => return Ok(row),
                Err(e) if e.is_duplicate() => {
                    warn!(attempt, number = %number, "invoice number taken concurrently, re-allocating");
                }
                Err(e) => return Err(db_error(e)),
            }
        }

        Err(InvoicingError::conflict(
            "could not allocate a unique invoice number, please retry",
        ))
    }

    /// Non-deleted invoice numbers within a numbering scope
    ///
    /// Soft-deleted invoices are excluded so their numbers are reused.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn existing_numbers(
        &self,
        owner_id: Uuid,
        scope: NumberScope,
    ) -> Result<Vec<String>, DatabaseError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT invoice_number
            FROM invoices
            WHERE owner_id = $1
              AND deleted_at IS NULL
              AND invoice_number LIKE $2
            "#,
        )
        .bind(owner_id)
        .bind(scope.like_pattern())
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn insert_invoice(
        &self,
        draft: &InvoiceDraft,
        owner_id: Uuid,
        client_id: Uuid,
        invoice_number: &str,
    ) -> Result<InvoiceRow, DatabaseError> {
        let totals = &draft.totals;
        sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            INSERT INTO invoices (
                id, owner_id, client_id, invoice_number, issue_date, sale_date, due_date,
                currency, vat_rate, net_amount, vat_amount, gross_amount,
                net_amount_local, vat_amount_local, gross_amount_local,
                exchange_rate, exchange_rate_date, rate_is_custom,
                amount_in_words, is_manual, is_paid, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, FALSE, $21)
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(client_id)
        .bind(invoice_number)
        .bind(draft.issue_date)
        .bind(draft.sale_date)
        .bind(draft.due_date)
        .bind(draft.currency.code())
        .bind(draft.vat_rate.as_percentage())
        .bind(totals.net.amount())
        .bind(totals.vat.amount())
        .bind(totals.gross.amount())
        .bind(totals.net_local.map(|m| m.amount()))
        .bind(totals.vat_local.map(|m| m.amount()))
        .bind(totals.gross_local.map(|m| m.amount()))
        .bind(draft.exchange.map(|r| r.rate))
        .bind(draft.exchange.map(|r| r.rate_date))
        .bind(draft.exchange.map(|r| r.is_custom).unwrap_or(false))
        .bind(&totals.amount_in_words)
        .bind(draft.is_manual)
        .bind(&draft.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn insert_item(&self, invoice_id: Uuid, item: &DraftItem) -> Result<Uuid, DatabaseError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO invoice_items (id, invoice_id, position, description, quantity, unit_price, net_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(invoice_id)
        .bind(item.position as i32)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.net_amount)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    /// Conditionally claims work records for an invoice
    ///
    /// Only rows whose `invoice_id` is still NULL are touched; the returned
    /// count tells the caller whether it won every record. A blind
    /// unconditional update would silently double-bill here.
    async fn claim_records(
        &self,
        record_ids: &[Uuid],
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE work_records
            SET invoice_id = $1
            WHERE id = ANY($2)
              AND owner_id = $3
              AND invoice_id IS NULL
              AND deleted_at IS NULL
            "#,
        )
        .bind(invoice_id)
        .bind(record_ids)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        Ok(result.rows_affected())
    }

    /// Best-effort compensating delete for a partially written invoice
    ///
    /// Releases any records already claimed, then removes the invoice row
    /// (items and links go with it via cascade). Failures are logged; the
    /// original error stays the one the caller sees.
    async fn compensate(&self, invoice_id: Uuid, cause: &str) {
        warn!(%invoice_id, cause, "compensating failed invoice generation");

        if let Err(e) = sqlx::query("UPDATE work_records SET invoice_id = NULL WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await
        {
            warn!(%invoice_id, error = %e, "compensation could not release work records");
        }

        if let Err(e) = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await
        {
            warn!(%invoice_id, error = %e, "compensation could not delete the invoice row");
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Lists the owner's non-deleted invoices, newest first
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<InvoiceRow>, DatabaseError> {
        sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE owner_id = $1 AND deleted_at IS NULL
            ORDER BY issue_date DESC, invoice_number DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    /// Fetches a non-deleted invoice owned by the caller
    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn find_owned(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<InvoiceRow>, DatabaseError> {
        sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#
        ))
        .bind(invoice_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    /// Items of an invoice in position order
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItemRow>, DatabaseError> {
        sqlx::query_as::<_, InvoiceItemRow>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM invoice_items
            WHERE invoice_id = $1
            ORDER BY position
            "#
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Applies an edit: header update plus wholesale item replacement
    ///
    /// Stamps `is_edited`/`edited_at` and re-enforces number uniqueness.
    /// Replacing items deletes the previous set (links cascade with it) and
    /// does NOT release previously billed work records - only invoice
    /// deletion unlocks them. That asymmetry is inherited behavior, kept on
    /// purpose.
    #[instrument(skip(self, revision), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn update_invoice(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        revision: &InvoiceRevision,
    ) -> Result<InvoiceRow, InvoicingError> {
        let totals = &revision.totals;
        let updated = sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            UPDATE invoices
            SET invoice_number = $3,
                issue_date = $4,
                sale_date = $5,
                due_date = $6,
                vat_rate = $7,
                net_amount = $8,
                vat_amount = $9,
                gross_amount = $10,
                net_amount_local = $11,
                vat_amount_local = $12,
                gross_amount_local = $13,
                exchange_rate = $14,
                exchange_rate_date = $15,
                rate_is_custom = $16,
                amount_in_words = $17,
                notes = $18,
                is_edited = TRUE,
                edited_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(invoice_id)
        .bind(owner_id)
        .bind(&revision.invoice_number)
        .bind(revision.issue_date)
        .bind(revision.sale_date)
        .bind(revision.due_date)
        .bind(revision.vat_rate)
        .bind(totals.net.amount())
        .bind(totals.vat.amount())
        .bind(totals.gross.amount())
        .bind(totals.net_local.map(|m| m.amount()))
        .bind(totals.vat_local.map(|m| m.amount()))
        .bind(totals.gross_local.map(|m| m.amount()))
        .bind(revision.exchange.map(|r| r.rate))
        .bind(revision.exchange.map(|r| r.rate_date))
        .bind(revision.exchange.map(|r| r.is_custom).unwrap_or(false))
        .bind(&totals.amount_in_words)
        .bind(&revision.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match classify(e) {
            e if e.is_duplicate() => {
                InvoicingError::conflict("invoice number already in use")
            }
            e => db_error(e),
        })?
        .ok_or_else(|| InvoicingError::not_found("invoice not found"))?;

        // Replace the item set: delete-all, insert-new. Old links cascade
        // away with the old items.
        if let Err(e) = sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await
        {
            warn!(%invoice_id, error = %e, "item replacement could not delete previous items");
            return Err(InvoicingError::write(format!(
                "failed to replace invoice items: {e}"
            )));
        }

        for item in &revision.items {
            if let Err(e) = self.insert_item(invoice_id, item).await {
                warn!(%invoice_id, error = %e, "item replacement left the invoice without full items");
                return Err(InvoicingError::write(format!(
                    "failed to write replacement item '{}': {e}",
                    item.description
                )));
            }
        }

        info!(invoice_id = %invoice_id, "Invoice edited");
        Ok(updated)
    }

    /// Toggles the paid flag
    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn set_paid(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        is_paid: bool,
    ) -> Result<Option<InvoiceRow>, DatabaseError> {
        sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            UPDATE invoices
            SET is_paid = $3
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(invoice_id)
        .bind(owner_id)
        .bind(is_paid)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    /// Soft-deletes an invoice and releases everything it held
    ///
    /// In order: stamp `deleted_at`, delete items (links cascade), clear the
    /// invoice reference on every previously linked work record. The release
    /// runs even when the item delete fails - leaving records locked to a
    /// deleted invoice would orphan them permanently.
    #[instrument(skip(self), fields(owner_id = %owner_id, invoice_id = %invoice_id))]
    pub async fn soft_delete(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<bool, InvoicingError> {
        let marked = sqlx::query(
            r#"
            UPDATE invoices
            SET deleted_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(invoice_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(classify(e)))?;

        if marked.rows_affected() == 0 {
            return Ok(false);
        }

        let mut first_failure: Option<InvoicingError> = None;

        if let Err(e) = sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await
        {
            warn!(%invoice_id, error = %e, "invoice delete could not remove items");
            first_failure = Some(InvoicingError::write(format!(
                "failed to delete invoice items: {e}"
            )));
        }

        let released = sqlx::query("UPDATE work_records SET invoice_id = NULL WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await;

        match released {
            Ok(result) => {
                info!(
                    invoice_id = %invoice_id,
                    released = result.rows_affected(),
                    "Invoice deleted, work records released"
                );
            }
            Err(e) => {
                warn!(%invoice_id, error = %e, "invoice delete could not release work records");
                if first_failure.is_none() {
                    first_failure = Some(InvoicingError::write(format!(
                        "failed to release work records: {e}"
                    )));
                }
            }
        }

        match first_failure {
            Some(error) => Err(error),
            None => Ok(true),
        }
    }
}

/// Maps infrastructure errors onto the domain taxonomy
fn db_error(error: DatabaseError) -> InvoicingError {
    match error {
        e if e.is_duplicate() => InvoicingError::conflict(e.to_string()),
        e if e.is_not_found() => InvoicingError::not_found(e.to_string()),
        e => InvoicingError::write(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_maps_to_conflict() {
        let error = db_error(DatabaseError::duplicate(
            "Invoice",
            "invoice_number",
            "FV/2026/08/001",
        ));
        assert!(matches!(error, InvoicingError::Conflict(_)));
    }

    #[test]
    fn not_found_maps_through() {
        let error = db_error(DatabaseError::not_found("Invoice", "x"));
        assert!(matches!(error, InvoicingError::NotFound(_)));
    }

    #[test]
    fn other_errors_become_write_failures() {
        let error = db_error(DatabaseError::QueryFailed("boom".into()));
        assert!(matches!(error, InvoicingError::Write(_)));
        assert_eq!(error.code(), "write_failed");
    }
}
