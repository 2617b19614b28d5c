//! Bill calculation and history handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use core_kernel::{BillRecordId, BillingMonth};
use domain_billing::{BillBreakdown, BillRecord, MonthlyAggregate};

use crate::dto::calculation::*;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::pdf::{attachment_filename, render_bill, PDF_CONTENT_TYPE};
use crate::AppState;

/// Prices consumption and records the bill
pub async fn calculate_bill(
    State(state): State<AppState>,
    Json(request): Json<CalculateBillRequest>,
) -> Result<Json<BillBreakdown>, ApiError> {
    let bill = state.billing.calculate(request.into()).await?;
    Ok(Json(bill))
}

/// Prices consumption, records the bill and returns it as a PDF download
pub async fn calculate_bill_pdf(
    State(state): State<AppState>,
    Json(request): Json<CalculateBillRequest>,
) -> Result<Response, ApiError> {
    let bill = state.billing.calculate(request.into()).await?;
    let document = render_bill(&bill)?;
    let filename = attachment_filename(&bill);

    info!(filename = %filename, size = document.len(), "Bill document rendered");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename={}", filename)),
        ],
        document,
    )
        .into_response())
}

/// One page of bill history, newest first
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let page = state.history.list_page(query.into()).await?;
    Ok(Json(page.into()))
}

pub async fn history_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BillRecord>, ApiError> {
    let id: BillRecordId = parse_id(&id, "bill record")?;
    let record = state.history.get_by_id(id).await?;
    Ok(Json(record))
}

/// Every bill of one consumer, newest first
pub async fn consumer_history(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
) -> Result<Json<Vec<BillRecord>>, ApiError> {
    let records = state.history.list_by_consumer(&consumer_id).await?;
    Ok(Json(records))
}

/// Per-consumer-type totals for a `YYYY-MM` month
pub async fn monthly_stats(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<Json<Vec<MonthlyAggregate>>, ApiError> {
    let month: BillingMonth = month
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid month: {}", month)))?;
    let stats = state.history.monthly_aggregate(month).await?;
    Ok(Json(stats))
}
