//! Work record handlers
//!
//! Create and list feed the billing flow; update and delete run through the
//! billing-lock guard twice: the domain state machine produces the typed
//! locked error for records billed by a non-deleted invoice, and the
//! repository's conditional SQL closes the race window a pure read check
//! leaves open.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ClientId, Currency, InvoiceId, OwnerId, WorkRecordId};
use domain_invoicing::work_record::{BillingState, WorkRecord};
use infra_db::repositories::{
    ClientRepository, NewWorkRecord, UpdateWorkRecord, WorkRecordRepository, WorkRecordRow,
};

use crate::auth::Claims;
use crate::dto::work_records::*;
use crate::error::ApiError;
use crate::AppState;

fn owner_from(claims: &Claims) -> Result<Uuid, ApiError> {
    claims.owner_id().map_err(|_| ApiError::Unauthorized)
}

/// Lifts a row into the domain record with its billing state
fn to_domain(row: &WorkRecordRow, locked_by_invoice: bool) -> Result<WorkRecord, ApiError> {
    let currency: Currency = row.currency.parse().map_err(|_| {
        ApiError::Internal(format!(
            "work record {} carries an unsupported currency '{}'",
            row.id, row.currency
        ))
    })?;

    let billing = match (locked_by_invoice, row.invoice_id) {
        (true, Some(invoice_id)) => BillingState::Billed {
            invoice_id: InvoiceId::from(invoice_id),
        },
        _ => BillingState::Unbilled,
    };

    Ok(WorkRecord {
        id: WorkRecordId::from(row.id),
        owner_id: OwnerId::from(row.owner_id),
        client_id: ClientId::from(row.client_id),
        work_date: row.work_date,
        hours: row.hours,
        hourly_rate: row.hourly_rate,
        currency,
        description: row.description.clone(),
        private_note: row.private_note.clone(),
        billing,
        deleted_at: row.deleted_at,
    })
}

fn validate_pricing(hours: Option<Decimal>, hourly_rate: Option<Decimal>) -> Result<(), ApiError> {
    if let Some(hours) = hours {
        if hours <= Decimal::ZERO {
            return Err(ApiError::Validation("hours must be positive".to_string()));
        }
    }
    if let Some(rate) = hourly_rate {
        if rate < Decimal::ZERO {
            return Err(ApiError::Validation(
                "hourly rate cannot be negative".to_string(),
            ));
        }
    }
    Ok(())
}

/// Creates a work record for one of the owner's clients
pub async fn create_work_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateWorkRecordRequest>,
) -> Result<(StatusCode, Json<WorkRecordResponse>), ApiError> {
    request.validate()?;
    let owner_id = owner_from(&claims)?;
    validate_pricing(Some(request.hours), Some(request.hourly_rate))?;

    let clients = ClientRepository::new(state.pool.clone());
    let client = clients
        .find_owned(owner_id, request.client_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("client not found".to_string()))?;

    let repository = WorkRecordRepository::new(state.pool.clone());
    let row = repository
        .create(&NewWorkRecord {
            owner_id,
            client_id: client.id,
            work_date: request.work_date,
            hours: request.hours,
            hourly_rate: request.hourly_rate,
            // Records are priced in the client's billing currency
            currency: client.currency,
            description: request.description,
            private_note: request.private_note,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Lists work records, optionally only those available for billing
pub async fn list_work_records(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListWorkRecordsQuery>,
) -> Result<Json<Vec<WorkRecordResponse>>, ApiError> {
    let owner_id = owner_from(&claims)?;

    let repository = WorkRecordRepository::new(state.pool.clone());
    let rows = repository.list(owner_id, query.unbilled).await?;

    Ok(Json(rows.into_iter().map(WorkRecordResponse::from).collect()))
}

/// Updates an unbilled work record
pub async fn update_work_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWorkRecordRequest>,
) -> Result<Json<WorkRecordResponse>, ApiError> {
    let owner_id = owner_from(&claims)?;
    validate_pricing(request.hours, request.hourly_rate)?;

    let repository = WorkRecordRepository::new(state.pool.clone());
    let row = repository
        .find_owned(owner_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("work record not found".to_string()))?;

    let locking_number = repository.locking_invoice_number(id).await?;
    let record = to_domain(&row, locking_number.is_some())?;
    if let Some(invoice_number) = &locking_number {
        record.ensure_unlocked(invoice_number)?;
    }

    let changes = UpdateWorkRecord {
        work_date: request.work_date,
        hours: request.hours,
        hourly_rate: request.hourly_rate,
        description: request.description,
        private_note: request.private_note,
    };

    match repository.update_unbilled(owner_id, id, &changes).await? {
        Some(updated) => Ok(Json(updated.into())),
        // The conditional update lost a race with a concurrent generation
        // or deletion between our check and the write.
        None => Err(ApiError::Conflict(
            "work record was billed or removed by a concurrent request".to_string(),
        )),
    }
}

/// Soft-deletes an unbilled work record
pub async fn delete_work_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let owner_id = owner_from(&claims)?;

    let repository = WorkRecordRepository::new(state.pool.clone());
    let row = repository
        .find_owned(owner_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("work record not found".to_string()))?;

    let locking_number = repository.locking_invoice_number(id).await?;
    let record = to_domain(&row, locking_number.is_some())?;
    if let Some(invoice_number) = &locking_number {
        record.ensure_unlocked(invoice_number)?;
    }

    if repository.delete_unbilled(owner_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::Conflict(
            "work record was billed or removed by a concurrent request".to_string(),
        ))
    }
}
