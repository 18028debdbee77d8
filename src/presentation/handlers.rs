// HTTP request handlers
use crate::application::session_runner::Visibility;
use crate::infrastructure::sse::view_events;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectMachineRequest {
    pub machine_id: String,
}

#[derive(Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List catalog machines, optionally for one location
pub async fn list_machines(
    Query(query): Query<LocationQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let machines = match query.location {
        Some(location) => state.fleet_service.machines_by_location(&location),
        None => state.fleet_service.list_machines(),
    };
    Json(machines)
}

pub async fn list_alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.fleet_service.all_alerts())
}

pub async fn machine_alerts(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    Json(state.fleet_service.alerts_for_machine(&id))
}

pub async fn fleet_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.fleet_service.fleet_stats())
}

/// Latest debounced session view, connection quality graded as of now
pub async fn session_view(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.session.latest() {
        Some(view) => Json(view.at(Utc::now())).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

pub async fn stream_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    view_events(state.session.subscribe())
}

pub async fn select_machine(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectMachineRequest>,
) -> StatusCode {
    match state.session.select_machine(request.machine_id).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!("Cannot select machine: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn set_visibility(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VisibilityRequest>,
) -> StatusCode {
    let visibility = if request.visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };

    match state.session.set_visibility(visibility).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!("Cannot change visibility: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Operator hook: drops the simulated link until it reconnects on its own
pub async fn force_disconnect(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.session.force_disconnect().await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!("Cannot force disconnect: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
