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
use crate::auth::policy::{Action, Role};
use crate::db::{NewRndTask, RndTaskUpdate};
use crate::entities::rnd_tasks;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RndTaskDto {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub created_at: String,
}

impl From<rnd_tasks::Model> for RndTaskDto {
    fn from(model: rnd_tasks::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            priority: model.priority,
            assigned_to: model.assigned_to,
            created_by: model.created_by,
            due_date: model.due_date,
            created_at: model.created_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRndTaskRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
}

fn default_priority() -> String {
    "medium".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRndTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
}

/// GET /api/rnd-tasks — managers see everything, everyone else only tasks
/// they created or were assigned.
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<RndTaskDto>>>, ApiError> {
    let claims = require_session(&state, &headers)?;

    let tasks = if claims.role == Role::Manager {
        state.store().list_rnd_tasks().await?
    } else {
        state.store().list_rnd_tasks_for_employee(&claims.sub).await?
    };

    let dtos: Vec<RndTaskDto> = tasks.into_iter().map(RndTaskDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/rnd-tasks (manager or rnd)
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateRndTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageRndTasks)?;

    if payload.title.is_empty() {
        return Err(ApiError::validation("Title is required"));
    }

    let task = state
        .store()
        .create_rnd_task(NewRndTask {
            title: payload.title,
            description: payload.description,
            priority: payload.priority,
            assigned_to: payload.assigned_to,
            created_by: claims.sub,
            due_date: payload.due_date,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RndTaskDto::from(task))),
    ))
}

/// GET /api/rnd-tasks/{id}
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RndTaskDto>>, ApiError> {
    require_session(&state, &headers)?;

    let task = state
        .store()
        .get_rnd_task(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("R&D task", &id))?;

    Ok(Json(ApiResponse::success(RndTaskDto::from(task))))
}

/// PUT /api/rnd-tasks/{id} (manager or rnd)
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRndTaskRequest>,
) -> Result<Json<ApiResponse<RndTaskDto>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageRndTasks)?;

    let task = state
        .store()
        .update_rnd_task(
            &id,
            RndTaskUpdate {
                title: payload.title,
                description: payload.description,
                status: payload.status,
                priority: payload.priority,
                assigned_to: payload.assigned_to,
                due_date: payload.due_date,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("R&D task", &id))?;

    Ok(Json(ApiResponse::success(RndTaskDto::from(task))))
}

/// DELETE /api/rnd-tasks/{id} (manager only)
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::DeleteRndTasks)?;

    let deleted = state.store().delete_rnd_task(&id).await?;
    if deleted {
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::not_found("R&D task", &id))
    }
}
