//! Bill handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::AuthenticatedCaller;
use crate::dto::bills::*;
use crate::dto::parse_amount;
use crate::handlers::parse_meter_id;
use crate::{error::ApiError, AppState};

/// Issues a bill for a meter reading (administrator only)
pub async fn generate_bill(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
    Json(request): Json<GenerateBillRequest>,
) -> Result<(StatusCode, Json<BillResponse>), ApiError> {
    let meter_id = parse_meter_id(&id)?;
    let bill_id = state.service.generate_bill(&caller, meter_id, request.reading)?;

    // Another request may issue a bill on the same meter before we read back
    let (index, bill) = state
        .service
        .get_meter_bills(meter_id)?
        .into_iter()
        .enumerate()
        .find(|(_, bill)| bill.id == bill_id)
        .ok_or_else(|| ApiError::Internal(format!("issued bill {} missing", bill_id)))?;

    Ok((StatusCode::CREATED, Json(BillResponse::new(index, bill))))
}

/// Lists a meter's bills in issue order
pub async fn list_bills(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BillResponse>>, ApiError> {
    let meter_id = parse_meter_id(&id)?;
    let bills = state.service.get_meter_bills(meter_id)?;

    Ok(Json(
        bills
            .into_iter()
            .enumerate()
            .map(|(index, bill)| BillResponse::new(index, bill))
            .collect(),
    ))
}

/// Gets a bill by its index on the meter
pub async fn get_bill(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<BillResponse>, ApiError> {
    let meter_id = parse_meter_id(&id)?;
    let bill = state.service.get_bill(meter_id, index)?;

    Ok(Json(BillResponse::new(index, bill)))
}

/// Settles a bill; open to any authenticated party
pub async fn pay_bill(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path((id, index)): Path<(String, usize)>,
    Json(request): Json<PayBillRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    request.validate()?;
    let meter_id = parse_meter_id(&id)?;
    let tendered = parse_amount("amount", &request.amount, state.service.currency())?;

    // The refund transfer may block, so keep it off the async workers
    let service = state.service.clone();
    let receipt = tokio::task::spawn_blocking(move || {
        service.pay_bill(&caller, meter_id, index, tendered)
    })
    .await??;
    Ok(Json(receipt.into()))
}
