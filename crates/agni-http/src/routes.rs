use std::str::FromStr;

use agni_core::LogLevel;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::server::AppState;

pub async fn live() -> impl IntoResponse {
    Json(json!({"Status": "LIVE"}))
}

pub async fn info(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.info())
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.status())
}

pub async fn monitor_start(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.start_ws_monitor().await {
        Ok(()) => (StatusCode::OK, Json(json!({"Status": "OK"}))).into_response(),
        Err(message) => (StatusCode::OK, format!("Failed. {message}")).into_response(),
    }
}

pub async fn monitor_stop(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.stop_ws_monitor().await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(_) => (StatusCode::OK, "FAILED").into_response(),
    }
}

pub async fn config_reload(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.reload_config().await {
        Ok(()) => (StatusCode::OK, Json(json!({"Status": "OK"}))).into_response(),
        Err(message) => (StatusCode::INTERNAL_SERVER_ERROR, message).into_response(),
    }
}

pub async fn config_save(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> impl IntoResponse {
    if body.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    match state.controller.save_app_config(&body).await {
        Ok(()) => (StatusCode::OK, Json(json!({"Status": "OK"}))).into_response(),
        Err(message) => (StatusCode::INTERNAL_SERVER_ERROR, message).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct LevelQuery {
    level: Option<String>,
}

pub async fn log_setlevel(
    State(state): State<AppState>,
    Query(query): Query<LevelQuery>,
) -> impl IntoResponse {
    let Some(level) = query.level else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    match LogLevel::from_str(&level) {
        Ok(level) => {
            state.controller.set_log_level(level);
            (StatusCode::OK, Json(json!({"Status": "OK"}))).into_response()
        }
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

pub async fn units_list(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.list_units())
}

#[derive(Debug, Deserialize)]
pub struct UnitStopQuery {
    name: Option<String>,
    #[allow(dead_code)]
    force: Option<bool>,
}

/// Reserved per `spec.md` §9's open question: the source returns
/// hard-coded success for unit stop/start/restart with no real semantics
/// specified. `name` is still required, matching the 400-on-missing-param
/// rule that applies to every other query-parameterized route.
pub async fn unit_stop(Query(query): Query<UnitStopQuery>) -> impl IntoResponse {
    if query.name.is_none() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    (StatusCode::OK, Json(json!({"Status": "OK"}))).into_response()
}

pub async fn unit_start(Path(_name): Path<String>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"Status": "OK"})))
}

#[derive(Debug, Deserialize)]
pub struct RestartQuery {
    #[allow(dead_code)]
    force: Option<bool>,
}

pub async fn unit_restart(
    Path(_name): Path<String>,
    Query(_query): Query<RestartQuery>,
) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"Status": "OK"})))
}

pub async fn unit_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.controller.unit_status(&name) {
        Some(value) => Json(value).into_response(),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}
