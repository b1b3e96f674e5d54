use std::sync::OnceLock;
use std::time::Instant;

use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Record the process start time; call once from main before serving.
pub fn mark_started() {
    let _ = STARTED_AT.set(Instant::now());
}

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    status: String,
    uptime_secs: u64,
    environment: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let uptime_secs = STARTED_AT
        .get()
        .map(|started| started.elapsed().as_secs())
        .unwrap_or(0);
    let data = HealthData {
        status: "ok".to_string(),
        uptime_secs,
        environment: state.config.environment.clone(),
    };

    Json(ApiResponse::success(
        "Health check",
        data,
        Some(Meta::empty()),
    ))
}
