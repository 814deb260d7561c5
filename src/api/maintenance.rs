use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::{require_role, require_session};
use super::{ApiError, ApiResponse, AppState};
use crate::auth::policy::Action;
use crate::db::{
    MaintenanceTaskUpdate, NewMaintenanceTask, PartUsageOutcome, RemoveUsageOutcome,
};
use crate::entities::{maintenance_tasks, task_part_usage};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceTaskDto {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub priority: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
    pub total_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<maintenance_tasks::Model> for MaintenanceTaskDto {
    fn from(model: maintenance_tasks::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            asset_id: model.asset_id,
            assigned_to: model.assigned_to,
            priority: model.priority,
            status: model.status,
            scheduled_date: model.scheduled_date,
            completed_date: model.completed_date,
            total_cost: model.total_cost,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartUsageDto {
    pub id: String,
    pub task_id: String,
    pub part_id: String,
    pub quantity: i32,
    pub price_at_time: f64,
}

impl From<task_part_usage::Model> for PartUsageDto {
    fn from(model: task_part_usage::Model) -> Self {
        Self {
            id: model.id,
            task_id: model.task_id,
            part_id: model.part_id,
            quantity: model.quantity,
            price_at_time: model.price_at_time,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetailDto {
    #[serde(flatten)]
    pub task: MaintenanceTaskDto,
    pub parts_usage: Vec<PartUsageDto>,
}

#[derive(Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub asset_id: Option<String>,
    pub assigned_to: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
    pub scheduled_date: Option<String>,
    pub notes: Option<String>,
}

fn default_priority() -> String {
    "medium".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub scheduled_date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPartRequest {
    #[serde(default)]
    pub part_id: String,
    #[serde(default)]
    pub quantity: i32,
}

/// GET /api/maintenance-tasks
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<ApiResponse<Vec<MaintenanceTaskDto>>>, ApiError> {
    require_session(&state, &headers)?;

    let tasks = state
        .store()
        .list_maintenance_tasks(query.status.as_deref())
        .await?;
    let dtos: Vec<MaintenanceTaskDto> = tasks.into_iter().map(MaintenanceTaskDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/maintenance-tasks (manager or maintenance)
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageMaintenance)?;

    if payload.title.is_empty() {
        return Err(ApiError::validation("Title is required"));
    }

    if let Some(asset_id) = &payload.asset_id
        && state.store().get_asset(asset_id).await?.is_none()
    {
        return Err(ApiError::not_found("Asset", asset_id));
    }

    let task = state
        .store()
        .create_maintenance_task(NewMaintenanceTask {
            title: payload.title,
            description: payload.description,
            asset_id: payload.asset_id,
            assigned_to: payload.assigned_to,
            priority: payload.priority,
            scheduled_date: payload.scheduled_date,
            notes: payload.notes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MaintenanceTaskDto::from(task))),
    ))
}

/// GET /api/maintenance-tasks/{id} — task with its part usage.
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TaskDetailDto>>, ApiError> {
    require_session(&state, &headers)?;

    let task = state
        .store()
        .get_maintenance_task(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Maintenance task", &id))?;

    let usage = state.store().get_task_part_usage(&id).await?;

    Ok(Json(ApiResponse::success(TaskDetailDto {
        task: MaintenanceTaskDto::from(task),
        parts_usage: usage.into_iter().map(PartUsageDto::from).collect(),
    })))
}

/// PUT /api/maintenance-tasks/{id} (manager or maintenance)
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<MaintenanceTaskDto>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageMaintenance)?;

    let task = state
        .store()
        .update_maintenance_task(
            &id,
            MaintenanceTaskUpdate {
                title: payload.title,
                description: payload.description,
                priority: payload.priority,
                status: payload.status,
                assigned_to: payload.assigned_to,
                scheduled_date: payload.scheduled_date,
                notes: payload.notes,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Maintenance task", &id))?;

    Ok(Json(ApiResponse::success(MaintenanceTaskDto::from(task))))
}

/// DELETE /api/maintenance-tasks/{id} (manager only)
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::DeleteMaintenance)?;

    let deleted = state.store().delete_maintenance_task(&id).await?;
    if deleted {
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::not_found("Maintenance task", &id))
    }
}

/// POST /api/maintenance-tasks/{id}/parts (manager or maintenance)
///
/// Stock decrement, usage record and task cost move in one transaction; a
/// rejection leaves the inventory untouched.
pub async fn add_part(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<AddPartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageMaintenance)?;

    if payload.part_id.is_empty() || payload.quantity <= 0 {
        return Err(ApiError::validation("Invalid part or quantity"));
    }

    let outcome = state
        .store()
        .add_task_part_usage(&id, &payload.part_id, payload.quantity)
        .await?;

    match outcome {
        PartUsageOutcome::Applied(usage) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(PartUsageDto::from(usage))),
        )),
        PartUsageOutcome::TaskNotFound => Err(ApiError::not_found("Maintenance task", &id)),
        PartUsageOutcome::PartNotFound => Err(ApiError::not_found("Spare part", &payload.part_id)),
        PartUsageOutcome::InsufficientStock { available } => Err(ApiError::conflict(format!(
            "Insufficient stock: {available} available"
        ))),
    }
}

/// DELETE /api/maintenance-tasks/{id}/parts/{usage_id} (manager or maintenance)
pub async fn remove_part(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, usage_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageMaintenance)?;

    let outcome = state.store().remove_task_part_usage(&id, &usage_id).await?;

    match outcome {
        RemoveUsageOutcome::Removed => Ok(Json(ApiResponse::success(true))),
        RemoveUsageOutcome::UsageNotFound => Err(ApiError::not_found("Usage record", &usage_id)),
        RemoveUsageOutcome::TaskMismatch => Err(ApiError::validation(
            "Usage record does not belong to this task",
        )),
    }
}
