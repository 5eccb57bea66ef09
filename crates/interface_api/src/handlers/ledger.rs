//! Ledger-wide reporting handlers

use axum::{
    extract::{Query, State},
    Json,
};

use domain_billing::LedgerStats;

use crate::dto::ledger::{EventResponse, EventsQuery};
use crate::AppState;

/// Meter and bill counts
pub async fn stats(State(state): State<AppState>) -> Json<LedgerStats> {
    Json(state.service.stats())
}

/// Notifications after `?after=N`, in commit order
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<EventResponse>> {
    Json(
        state
            .service
            .events_since(query.after)
            .into_iter()
            .map(EventResponse::from)
            .collect(),
    )
}
