//! Custody handlers

use axum::{extract::State, Json};

use crate::auth::AuthenticatedCaller;
use crate::dto::custody::*;
use crate::{error::ApiError, AppState};

/// Current custody balance and lifetime totals
pub async fn get_custody(State(state): State<AppState>) -> Json<CustodyResponse> {
    Json(state.service.custody().into())
}

/// Pays the custody balance out to the administrator (administrator only)
pub async fn withdraw(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<Json<WithdrawalResponse>, ApiError> {
    let service = state.service.clone();
    let receipt = tokio::task::spawn_blocking(move || service.withdraw_funds(&caller)).await??;
    Ok(Json(receipt.into()))
}
