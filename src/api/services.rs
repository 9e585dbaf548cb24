use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use super::{
    error::ApiError,
    models::{StatusResponse, TriggerResponse},
    state::AppState,
};
use crate::dashboard::{EventKind, Queued};
use crate::store::DASHBOARD_KEY;

/// Liveness probe (GET /health)
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Dispatcher phase and cycle counters (GET /status)
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let last_cycle = state.store.get(DASHBOARD_KEY).await.map(|item| item.saved);
    let phase = *state.phase.borrow();

    Json(StatusResponse {
        phase,
        instances: state.instances,
        metrics: state.metrics.snapshot(),
        last_cycle,
    })
}

/// Most recent snapshot (GET /dashboard)
///
/// 404 until the first cycle has finished.
pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .store
        .get(DASHBOARD_KEY)
        .await
        .ok_or_else(|| ApiError::NotFound("no dashboard state collected yet".to_string()))?;

    Ok(Json(item.data))
}

/// Ask for a cycle (POST /trigger/dashboard)
///
/// 202 when queued; 200 with `coalesced` when a cycle is already pending.
pub async fn trigger_dashboard(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let event = EventKind::Api;
    let queued = state.trigger.fire(event)?;

    let code = match queued {
        Queued::Accepted => StatusCode::ACCEPTED,
        Queued::Coalesced => StatusCode::OK,
    };

    Ok((code, Json(TriggerResponse { status: queued, event })))
}
