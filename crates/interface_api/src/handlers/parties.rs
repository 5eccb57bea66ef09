//! Party handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::dto::ledger::AccountSummaryResponse;
use crate::dto::meters::MeterResponse;
use crate::handlers::parse_party_id;
use crate::{error::ApiError, AppState};

/// Lists the meters registered to a party
pub async fn list_party_meters(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MeterResponse>>, ApiError> {
    let owner = parse_party_id(&id)?;

    let meters = state
        .service
        .get_user_meters(owner)
        .into_iter()
        .map(|meter_id| state.service.get_meter_details(meter_id).map(MeterResponse::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(meters))
}

/// Dashboard totals for a party
pub async fn account_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountSummaryResponse>, ApiError> {
    let owner = parse_party_id(&id)?;
    Ok(Json(state.service.account_summary(owner)?.into()))
}
