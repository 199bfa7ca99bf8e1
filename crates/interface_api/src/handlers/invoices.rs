//! Invoice handlers
//!
//! Generation orchestrates the pure domain steps (aggregation, rate
//! resolution, totals) and hands the assembled draft to the repository
//! saga. Edits merge the partial request into stored state, re-aggregate,
//! and recompute before the wholesale update.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ClientId, Currency, OwnerId, VatRate, WorkRecordId};
use domain_invoicing::aggregation::{
    aggregate, group_by_description, BillableRecord, DraftItem, ItemGrouping, ManualItem,
};
use domain_invoicing::exchange::{resolve_rate, ResolvedRate};
use domain_invoicing::invoice::InvoiceDraft;
use domain_invoicing::totals::compute_totals;
use infra_db::repositories::{
    ClientRepository, ExchangeRateRepository, InvoiceRepository, InvoiceRevision,
    WorkRecordRepository, WorkRecordRow,
};

use crate::auth::Claims;
use crate::dto::invoices::*;
use crate::error::ApiError;
use crate::AppState;

fn owner_from(claims: &Claims) -> Result<Uuid, ApiError> {
    claims.owner_id().map_err(|_| ApiError::Unauthorized)
}

fn parse_currency(code: &str, client_id: Uuid) -> Result<Currency, ApiError> {
    code.parse().map_err(|_| {
        ApiError::Internal(format!(
            "client {client_id} carries an unsupported currency '{code}'"
        ))
    })
}

fn to_billable(row: &WorkRecordRow) -> BillableRecord {
    BillableRecord {
        id: WorkRecordId::from(row.id),
        description: row.description.clone(),
        hours: row.hours,
        hourly_rate: row.hourly_rate,
    }
}

/// Generates an invoice from work records and/or manual items
pub async fn generate_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<GenerateInvoiceRequest>,
) -> Result<(StatusCode, Json<GenerateInvoiceResponse>), ApiError> {
    request.validate()?;
    let owner_id = owner_from(&claims)?;

    let vat_rate = VatRate::from_percentage(request.vat_rate)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let clients = ClientRepository::new(state.pool.clone());
    let client = clients
        .find_owned(owner_id, request.client_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("client not found".to_string()))?;
    let currency = parse_currency(&client.currency, client.id)?;

    // Collect the requested work-record ids: explicit groupings win over the
    // flat selection.
    let requested_ids: Vec<Uuid> = match (&request.items, &request.time_entry_ids) {
        (Some(groupings), _) => groupings
            .iter()
            .flat_map(|g| g.time_entry_ids.iter().copied())
            .collect(),
        (None, Some(ids)) => ids.clone(),
        (None, None) => Vec::new(),
    };
    let unique_requested: BTreeSet<Uuid> = requested_ids.iter().copied().collect();
    if requested_ids.len() != unique_requested.len() {
        return Err(ApiError::Validation(
            "a time entry may only be selected once".to_string(),
        ));
    }

    let work_records = WorkRecordRepository::new(state.pool.clone());
    let billable_rows = if unique_requested.is_empty() {
        Vec::new()
    } else {
        work_records
            .fetch_billable(owner_id, client.id, &requested_ids)
            .await?
    };

    if billable_rows.len() != unique_requested.len() {
        return Err(ApiError::BadRequest(
            "some selected time entries are missing, deleted, or already billed".to_string(),
        ));
    }

    let billable: Vec<BillableRecord> = billable_rows.iter().map(to_billable).collect();

    let groupings: Vec<ItemGrouping> = match &request.items {
        Some(groups) => groups
            .iter()
            .map(|g| ItemGrouping {
                description: g.description.clone(),
                record_ids: g
                    .time_entry_ids
                    .iter()
                    .map(|id| WorkRecordId::from(*id))
                    .collect(),
            })
            .collect(),
        None => group_by_description(&billable),
    };

    let manual: Vec<ManualItem> = request
        .manual_items
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|item| ManualItem {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect();

    let items = aggregate(&groupings, &billable, &manual)?;

    let rates = ExchangeRateRepository::new(state.pool.clone());
    let cached = if currency.is_local() || request.custom_exchange_rate.is_some() {
        None
    } else {
        rates.find_rate(currency.code(), request.issue_date).await?
    };
    let exchange = resolve_rate(
        currency,
        request.issue_date,
        request.custom_exchange_rate,
        cached,
    )?;

    let draft = InvoiceDraft::assemble(
        OwnerId::from(owner_id),
        ClientId::from(client.id),
        currency,
        request.issue_date,
        request.sale_date,
        request.due_date,
        vat_rate,
        items,
        exchange,
        request.notes,
    )?;

    let invoices = InvoiceRepository::new(state.pool.clone());
    let row = invoices.generate(&draft).await?;

    let response = GenerateInvoiceResponse {
        id: row.id,
        invoice_number: row.invoice_number.clone(),
        gross_amount: row.gross_amount,
        currency: row.currency.clone(),
        message: format!("Invoice {} generated", row.invoice_number),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Lists the owner's invoices (soft-deleted ones are absent)
pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<InvoiceSummaryResponse>>, ApiError> {
    let owner_id = owner_from(&claims)?;

    let invoices = InvoiceRepository::new(state.pool.clone());
    let rows = invoices.list(owner_id).await?;
    Ok(Json(rows.into_iter().map(InvoiceSummaryResponse::from).collect()))
}

/// Gets an invoice with its items
pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let owner_id = owner_from(&claims)?;

    let invoices = InvoiceRepository::new(state.pool.clone());
    let invoice = invoices
        .find_owned(owner_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("invoice not found".to_string()))?;
    let items = invoices.items(id).await?;

    Ok(Json(InvoiceResponse::from_rows(invoice, items)))
}

/// Applies a partial edit with full item replacement
///
/// Replacing items does not release previously billed work records; only
/// deleting the invoice does.
pub async fn update_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    request.validate()?;
    let owner_id = owner_from(&claims)?;

    let invoices = InvoiceRepository::new(state.pool.clone());
    let current = invoices
        .find_owned(owner_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("invoice not found".to_string()))?;
    let currency = parse_currency(&current.currency, current.client_id)?;

    let vat_rate = VatRate::from_percentage(request.vat_rate.unwrap_or(current.vat_rate))
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    // Replacement items, or the stored ones re-read for recomputation
    let items: Vec<DraftItem> = match &request.items {
        Some(replacement) => {
            let manual: Vec<ManualItem> = replacement
                .iter()
                .map(|item| ManualItem {
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect();
            aggregate(&[], &[], &manual)?
        }
        None => invoices
            .items(id)
            .await?
            .into_iter()
            .map(|row| DraftItem {
                position: row.position as u32,
                description: row.description,
                quantity: row.quantity,
                unit_price: row.unit_price,
                net_amount: row.net_amount,
                record_ids: Vec::new(),
            })
            .collect(),
    };

    let issue_date = request.issue_date.unwrap_or(current.issue_date);

    // A newly supplied custom rate wins; otherwise the stored rate stays in
    // force with its original date.
    let exchange = if currency.is_local() {
        None
    } else if request.custom_exchange_rate.is_some() {
        resolve_rate(currency, issue_date, request.custom_exchange_rate, None)?
    } else {
        current.exchange_rate.map(|rate| ResolvedRate {
            rate,
            rate_date: current.exchange_rate_date.unwrap_or(issue_date),
            is_custom: current.rate_is_custom,
        })
    };

    let totals = compute_totals(&items, currency, vat_rate, exchange.as_ref());

    let revision = InvoiceRevision {
        invoice_number: request
            .invoice_number
            .unwrap_or_else(|| current.invoice_number.clone()),
        issue_date,
        sale_date: request.sale_date.unwrap_or(current.sale_date),
        due_date: request.due_date.unwrap_or(current.due_date),
        vat_rate: vat_rate.as_percentage(),
        items,
        totals,
        exchange,
        notes: request.notes.or(current.notes),
    };

    let updated = invoices.update_invoice(owner_id, id, &revision).await?;
    let item_rows = invoices.items(id).await?;

    Ok(Json(InvoiceResponse::from_rows(updated, item_rows)))
}

/// Toggles the paid flag
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let owner_id = owner_from(&claims)?;

    let status = request.resolve().ok_or_else(|| {
        ApiError::Validation("provide is_paid or status: \"paid\"|\"unpaid\"".to_string())
    })?;

    let invoices = InvoiceRepository::new(state.pool.clone());
    let invoice = invoices
        .set_paid(owner_id, id, status.is_paid())
        .await?
        .ok_or_else(|| ApiError::NotFound("invoice not found".to_string()))?;
    let items = invoices.items(id).await?;

    Ok(Json(InvoiceResponse::from_rows(invoice, items)))
}

/// Soft-deletes an invoice, releasing its work records
pub async fn delete_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let owner_id = owner_from(&claims)?;

    let invoices = InvoiceRepository::new(state.pool.clone());
    let deleted = invoices.soft_delete(owner_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("invoice not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
