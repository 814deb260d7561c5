use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;

use super::auth::require_session;
use super::{ApiError, ApiResponse, AppState};
use crate::auth::policy::{Action, allows};
use crate::entities::activity_logs;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogDto {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub description: String,
    pub timestamp: String,
}

impl From<activity_logs::Model> for ActivityLogDto {
    fn from(model: activity_logs::Model) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_id,
            employee_name: model.employee_name,
            activity_type: model.activity_type,
            description: model.description,
            timestamp: model.timestamp,
        }
    }
}

/// GET /api/activity-logs — managers see the whole log, everyone else their
/// own entries.
pub async fn list_activity(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<ActivityLogDto>>>, ApiError> {
    let claims = require_session(&state, &headers)?;

    let logs = if allows(claims.role, Action::ViewAllActivity) {
        state.store().list_activity().await?
    } else {
        state.store().list_activity_for_employee(&claims.sub).await?
    };

    let dtos: Vec<ActivityLogDto> = logs.into_iter().map(ActivityLogDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/activity-logs/clock-in
pub async fn clock_in(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;

    if let Some(last) = state.store().latest_clock_event(&claims.sub).await?
        && last.activity_type == "clock_in"
    {
        return Err(ApiError::conflict("Already clocked in"));
    }

    let log = state
        .store()
        .record_activity(&claims.sub, &claims.name, "clock_in", "Clocked in")
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ActivityLogDto::from(log))),
    ))
}

/// POST /api/activity-logs/clock-out
pub async fn clock_out(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;

    let last = state.store().latest_clock_event(&claims.sub).await?;
    if !matches!(last, Some(event) if event.activity_type == "clock_in") {
        return Err(ApiError::conflict("Not clocked in"));
    }

    let log = state
        .store()
        .record_activity(&claims.sub, &claims.name, "clock_out", "Clocked out")
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ActivityLogDto::from(log))),
    ))
}
