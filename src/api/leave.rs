use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::{require_role, require_session};
use super::{ApiError, ApiResponse, AppState};
use crate::auth::policy::{Action, Role, allows};
use crate::db::NewLeaveRequest;
use crate::entities::leave_requests;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestDto {
    pub id: String,
    pub employee_id: String,
    #[serde(rename = "type")]
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_note: Option<String>,
    pub created_at: String,
}

impl From<leave_requests::Model> for LeaveRequestDto {
    fn from(model: leave_requests::Model) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_id,
            leave_type: model.leave_type,
            start_date: model.start_date,
            end_date: model.end_date,
            reason: model.reason,
            status: model.status,
            reviewed_by: model.reviewed_by,
            review_note: model.review_note,
            created_at: model.created_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequest {
    #[serde(rename = "type", default)]
    pub leave_type: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLeaveRequest {
    #[serde(default)]
    pub status: String,
    pub review_note: Option<String>,
}

const LEAVE_TYPES: [&str; 4] = ["sick", "personal", "annual", "other"];

/// GET /api/leave-requests — managers see everything, everyone else their own.
pub async fn list_leave_requests(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<LeaveRequestDto>>>, ApiError> {
    let claims = require_session(&state, &headers)?;

    let requests = if claims.role == Role::Manager {
        state.store().list_leave_requests().await?
    } else {
        state
            .store()
            .list_leave_requests_for_employee(&claims.sub)
            .await?
    };

    let dtos: Vec<LeaveRequestDto> = requests.into_iter().map(LeaveRequestDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/leave-requests — filed on the caller's own behalf.
pub async fn create_leave_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateLeaveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;

    if payload.start_date.is_empty() || payload.end_date.is_empty() {
        return Err(ApiError::validation("startDate and endDate are required"));
    }
    if !LEAVE_TYPES.contains(&payload.leave_type.as_str()) {
        return Err(ApiError::validation(format!(
            "Unknown leave type: {}",
            payload.leave_type
        )));
    }

    let request = state
        .store()
        .create_leave_request(NewLeaveRequest {
            employee_id: claims.sub.clone(),
            leave_type: payload.leave_type,
            start_date: payload.start_date,
            end_date: payload.end_date,
            reason: payload.reason,
        })
        .await?;

    state
        .store()
        .record_activity(
            &claims.sub,
            &claims.name,
            "leave_request",
            "Filed a leave request",
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(LeaveRequestDto::from(request))),
    ))
}

/// PUT /api/leave-requests/{id}/review (manager only)
pub async fn review_leave_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ReviewLeaveRequest>,
) -> Result<Json<ApiResponse<LeaveRequestDto>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ReviewLeave)?;

    if payload.status != "approved" && payload.status != "rejected" {
        return Err(ApiError::validation(
            "status must be 'approved' or 'rejected'",
        ));
    }

    let request = state
        .store()
        .review_leave_request(&id, &payload.status, &claims.sub, payload.review_note)
        .await?
        .ok_or_else(|| ApiError::not_found("Leave request", &id))?;

    Ok(Json(ApiResponse::success(LeaveRequestDto::from(request))))
}

/// DELETE /api/leave-requests/{id} — owner may withdraw a pending request,
/// managers may delete any.
pub async fn delete_leave_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let claims = require_session(&state, &headers)?;

    let request = state
        .store()
        .get_leave_request(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Leave request", &id))?;

    let is_owner = request.employee_id == claims.sub && request.status == "pending";
    if !is_owner && !allows(claims.role, Action::ReviewLeave) {
        return Err(ApiError::unauthorized());
    }

    state.store().delete_leave_request(&id).await?;
    Ok(Json(ApiResponse::success(true)))
}
