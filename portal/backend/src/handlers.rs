//! API Handlers

use axum::{extract::State, http::StatusCode, Json};
use console_access::{normalize_path, DenyReason, Identity};
use console_realtime::BusStats;
use crate::{AppState, models::*};

pub async fn health() -> &'static str {
    "OK"
}

// Access
pub async fn decide_access(
    State(state): State<AppState>,
    Json(req): Json<DecideRequest>,
) -> Result<Json<DecideResponse>, (StatusCode, String)> {
    let identity = Identity::from_payload(req.actor)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let Some(verdict) = state.engine.decide_identity(&identity, &req.path) else {
        return Err((StatusCode::UNAUTHORIZED, "no session actor".to_string()));
    };

    let redirect = match &verdict.reason {
        Some(DenyReason::UnrecognizedIdentity) => {
            tracing::warn!(path = %req.path, "decision requested for unrecognized identity");
            None
        }
        Some(_) => Some(state.config.forbidden_path.clone()),
        None => None,
    };

    Ok(Json(DecideResponse {
        path: normalize_path(&req.path),
        allowed: verdict.allowed,
        reason: verdict.reason,
        redirect,
    }))
}

// Realtime
pub async fn records_changed(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Json<PublishResponse> {
    let delivered = state.realtime.notify_records_changed(payload);
    Json(PublishResponse { delivered })
}

pub async fn realtime_stats(State(state): State<AppState>) -> Json<BusStats> {
    Json(state.realtime.stats())
}
