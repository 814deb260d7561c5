use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::require_session;
use super::{ApiError, ApiResponse, AppState};
use crate::db::NewVisit;
use crate::entities::visits;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitDto {
    pub id: String,
    pub employee_id: String,
    pub location_id: String,
    pub check_in_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<String>,
    pub objectives: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub met_owner: bool,
}

impl From<visits::Model> for VisitDto {
    fn from(model: visits::Model) -> Self {
        let objectives = if model.objectives.is_empty() {
            Vec::new()
        } else {
            model.objectives.split(',').map(str::to_string).collect()
        };

        Self {
            id: model.id,
            employee_id: model.employee_id,
            location_id: model.location_id,
            check_in_time: model.check_in_time,
            check_out_time: model.check_out_time,
            objectives,
            notes: model.notes,
            met_owner: model.met_owner,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVisitsQuery {
    pub employee_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitRequest {
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub met_owner: bool,
}

/// GET /api/visits
pub async fn list_visits(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListVisitsQuery>,
) -> Result<Json<ApiResponse<Vec<VisitDto>>>, ApiError> {
    require_session(&state, &headers)?;

    let visits = match query.employee_id.as_deref() {
        Some(employee_id) => state.store().list_visits_for_employee(employee_id).await?,
        None => state.store().list_visits().await?,
    };

    let dtos: Vec<VisitDto> = visits.into_iter().map(VisitDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/visits — check-in at a location, stamped with the caller's
/// identity from the session rather than trusting the request body.
pub async fn create_visit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateVisitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;

    if payload.location_id.is_empty() {
        return Err(ApiError::validation("locationId is required"));
    }

    let location = state.store().get_location(&payload.location_id).await?;
    if location.is_none() {
        return Err(ApiError::not_found("Location", &payload.location_id));
    }

    let visit = state
        .store()
        .create_visit(NewVisit {
            employee_id: claims.sub.clone(),
            location_id: payload.location_id,
            objectives: payload.objectives,
            notes: payload.notes,
            met_owner: payload.met_owner,
        })
        .await?;

    state
        .store()
        .record_activity(&claims.sub, &claims.name, "visit", "Checked in at location")
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(VisitDto::from(visit))),
    ))
}

/// PUT /api/visits/{id}/check-out
pub async fn check_out_visit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<VisitDto>>, ApiError> {
    require_session(&state, &headers)?;

    let visit = state
        .store()
        .check_out_visit(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Visit", &id))?;

    Ok(Json(ApiResponse::success(VisitDto::from(visit))))
}
