//! Rate configuration handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use core_kernel::RateEntryId;

use crate::auth::Claims;
use crate::dto::rates::*;
use crate::error::ApiError;
use crate::handlers::{parse_consumer_type, parse_id};
use crate::AppState;

/// Lists rate entries; `?active=true` restricts to entries in effect today
pub async fn list_rates(
    State(state): State<AppState>,
    Query(query): Query<ConfigListQuery>,
) -> Result<Json<Vec<RateEntryResponse>>, ApiError> {
    let entries = if query.active_only() {
        state.rates.find_active().await?
    } else {
        state.rates.find_all().await?
    };
    Ok(Json(entry_list(entries)))
}

/// Gets a rate entry by ID
pub async fn get_rate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RateEntryResponse>, ApiError> {
    let id: RateEntryId = parse_id(&id, "rate")?;
    let entry = state.rates.find_one(id).await?;
    Ok(Json(entry.into()))
}

/// Active entries that apply to a consumer type
pub async fn rates_for_consumer_type(
    State(state): State<AppState>,
    Path(consumer_type): Path<String>,
) -> Result<Json<Vec<RateEntryResponse>>, ApiError> {
    let consumer_type = parse_consumer_type(&consumer_type)?;
    let entries = state.rates.find_by_consumer_type(consumer_type).await?;
    Ok(Json(entry_list(entries)))
}

/// Tier bands of a consumer type
pub async fn tier_rates(
    State(state): State<AppState>,
    Path(consumer_type): Path<String>,
) -> Result<Json<Vec<RateEntryResponse>>, ApiError> {
    let consumer_type = parse_consumer_type(&consumer_type)?;
    let entries = state.rates.tier_rates(consumer_type).await?;
    Ok(Json(entry_list(entries)))
}

/// Taxes and surcharges of a consumer type
pub async fn taxes_and_surcharges(
    State(state): State<AppState>,
    Path(consumer_type): Path<String>,
) -> Result<Json<TaxesAndSurchargesResponse>, ApiError> {
    let consumer_type = parse_consumer_type(&consumer_type)?;
    let charges = state.rates.taxes_and_surcharges(consumer_type).await?;
    Ok(Json(charges.into()))
}

/// The flat rate the next calculation will use
pub async fn effective_rate(
    State(state): State<AppState>,
) -> Result<Json<EffectiveRateResponse>, ApiError> {
    let rate = state.rates.effective_rate().await?;
    Ok(Json(rate.into()))
}

/// Creates a rate entry attributed to the caller
pub async fn create_rate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateRateRequest>,
) -> Result<(StatusCode, Json<RateEntryResponse>), ApiError> {
    let entry = state
        .rates
        .create(request.into(), Some(claims.admin_id()?))
        .await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// Partially updates a rate entry
pub async fn update_rate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRateRequest>,
) -> Result<Json<RateEntryResponse>, ApiError> {
    let id: RateEntryId = parse_id(&id, "rate")?;
    let entry = state.rates.update(id, request.into()).await?;
    Ok(Json(entry.into()))
}

/// Flips a rate entry's active flag
pub async fn toggle_rate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RateEntryResponse>, ApiError> {
    let id: RateEntryId = parse_id(&id, "rate")?;
    let entry = state.rates.toggle_active(id).await?;
    Ok(Json(entry.into()))
}

/// Deletes a rate entry
pub async fn remove_rate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: RateEntryId = parse_id(&id, "rate")?;
    state.rates.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replaces every active entry with a single flat rate
pub async fn replace_flat_rate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<FlatRateRequest>,
) -> Result<Json<RateEntryResponse>, ApiError> {
    let entry = state
        .rates
        .replace_flat_rate(
            request.rate_per_unit,
            request.vat_percentage,
            request.fixed_service_charge,
            Some(claims.admin_id()?),
        )
        .await?;
    Ok(Json(entry.into()))
}
