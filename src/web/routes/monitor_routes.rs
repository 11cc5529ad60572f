use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

use crate::watchdog::models::{Monitor, NewMonitor};
use crate::web::models::monitor_models::{
    HeartbeatAccepted, MonitorCreated, MonitorHistory, MonitorList, MonitorPaused,
};
use crate::web::{AppError, AppState};

pub fn create_monitor_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/monitors", get(list_monitors).post(create_monitor))
        .route("/monitors/{id}", get(get_monitor))
        .route("/monitors/{id}/heartbeat", post(heartbeat))
        .route("/monitors/{id}/pause", post(pause_monitor))
        .route("/monitors/{id}/history", get(get_monitor_history))
}

#[axum::debug_handler]
async fn create_monitor(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<NewMonitor>,
) -> Result<(StatusCode, Json<MonitorCreated>), AppError> {
    let monitor = app_state.engine.register(payload)?;
    Ok((StatusCode::CREATED, Json(MonitorCreated::from(&monitor))))
}

#[axum::debug_handler]
async fn heartbeat(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<HeartbeatAccepted>, AppError> {
    let monitor = app_state.engine.heartbeat(&id)?;
    Ok(Json(HeartbeatAccepted::from(&monitor)))
}

#[axum::debug_handler]
async fn pause_monitor(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MonitorPaused>, AppError> {
    let monitor = app_state.engine.pause(&id)?;
    Ok(Json(MonitorPaused::from(&monitor)))
}

#[axum::debug_handler]
async fn list_monitors(State(app_state): State<Arc<AppState>>) -> Json<MonitorList> {
    let monitors = app_state.engine.list();
    let total = monitors.len();
    Json(MonitorList { monitors, total })
}

#[axum::debug_handler]
async fn get_monitor(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Monitor>, AppError> {
    Ok(Json(app_state.engine.get(&id)?))
}

#[axum::debug_handler]
async fn get_monitor_history(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MonitorHistory>, AppError> {
    let monitor = app_state.engine.get(&id)?;
    Ok(Json(MonitorHistory::from(monitor)))
}
