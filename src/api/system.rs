//! System status endpoint.

use axum::{Json, extract::State, http::HeaderMap};
use serde::Serialize;
use std::sync::Arc;

use super::auth::require_session;
use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub database_ok: bool,
    pub employee_count: usize,
}

/// GET /api/system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    require_session(&state, &headers)?;

    let database_ok = state.store().ping().await.is_ok();
    let employee_count = state.store().list_employees(None).await?.len();

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database_ok,
        employee_count,
    })))
}
