//! Meter handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::AuthenticatedCaller;
use crate::dto::meters::*;
use crate::dto::parse_amount;
use crate::handlers::parse_meter_id;
use crate::{error::ApiError, AppState};

/// Registers a meter (administrator only)
pub async fn register_meter(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(request): Json<RegisterMeterRequest>,
) -> Result<(StatusCode, Json<MeterResponse>), ApiError> {
    request.validate()?;
    let rate = parse_amount("rate", &request.rate, state.service.currency())?;

    let meter_id = state
        .service
        .register_meter(&caller, request.owner, &request.meter_type, rate)?;
    let meter = state.service.get_meter_details(meter_id)?;

    Ok((StatusCode::CREATED, Json(meter.into())))
}

/// Lists every meter
pub async fn list_meters(State(state): State<AppState>) -> Json<Vec<MeterResponse>> {
    Json(
        state
            .service
            .list_meters()
            .into_iter()
            .map(MeterResponse::from)
            .collect(),
    )
}

/// Gets a meter by ID
pub async fn get_meter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MeterResponse>, ApiError> {
    let meter_id = parse_meter_id(&id)?;
    Ok(Json(state.service.get_meter_details(meter_id)?.into()))
}

/// Changes a meter's rate (administrator only)
pub async fn update_rate(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
    Json(request): Json<UpdateRateRequest>,
) -> Result<Json<MeterResponse>, ApiError> {
    request.validate()?;
    let meter_id = parse_meter_id(&id)?;
    let rate = parse_amount("rate", &request.rate, state.service.currency())?;

    state.service.update_meter_rate(&caller, meter_id, rate)?;
    Ok(Json(state.service.get_meter_details(meter_id)?.into()))
}

/// Flips a meter's active flag (administrator only)
pub async fn toggle_status(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
) -> Result<Json<MeterStatusResponse>, ApiError> {
    let meter_id = parse_meter_id(&id)?;
    let active = state.service.toggle_meter_status(&caller, meter_id)?;

    Ok(Json(MeterStatusResponse { id: meter_id, active }))
}
