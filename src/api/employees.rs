use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{require_role, require_session};
use super::{ApiError, ApiResponse, AppState, EmployeeDto};
use crate::auth::policy::{Action, Role};
use crate::db::{EmployeeUpdate, NewEmployee};

#[derive(Deserialize)]
pub struct ListEmployeesQuery {
    pub role: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub avatar: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

/// GET /api/employees
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListEmployeesQuery>,
) -> Result<Json<ApiResponse<Vec<EmployeeDto>>>, ApiError> {
    require_session(&state, &headers)?;

    let employees = state.store().list_employees(query.role.as_deref()).await?;
    let dtos: Vec<EmployeeDto> = employees.into_iter().map(EmployeeDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/employees (manager only)
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageEmployees)?;

    if payload.name.is_empty()
        || payload.email.is_empty()
        || payload.username.is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::validation("Missing required fields"));
    }

    let role: Role = payload
        .role
        .parse()
        .map_err(|_| ApiError::validation(format!("Unknown role: {}", payload.role)))?;

    let security = state.config().read().await.security.clone();
    let employee = state
        .store()
        .create_employee(
            NewEmployee {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                role: role.as_str().to_string(),
                username: payload.username,
                password: payload.password,
                avatar: payload.avatar,
            },
            &security,
        )
        .await
        .map_err(|e| ApiError::from_store(e, "Email or username already exists"))?;

    tracing::info!("Employee created: {}", employee.username);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(EmployeeDto::from(employee))),
    ))
}

/// GET /api/employees/{id}
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError> {
    require_session(&state, &headers)?;

    let employee = state
        .store()
        .get_employee(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee", &id))?;

    Ok(Json(ApiResponse::success(EmployeeDto::from(employee))))
}

/// PUT /api/employees/{id} (manager only)
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageEmployees)?;

    if let Some(role) = &payload.role {
        role.parse::<Role>()
            .map_err(|_| ApiError::validation(format!("Unknown role: {role}")))?;
    }

    let update = EmployeeUpdate {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        role: payload.role,
        username: payload.username,
        password: payload.password,
        avatar: payload.avatar,
    };

    let security = state.config().read().await.security.clone();
    let employee = state
        .store()
        .update_employee(&id, update, &security)
        .await
        .map_err(|e| ApiError::from_store(e, "Email or username already exists"))?
        .ok_or_else(|| ApiError::not_found("Employee", &id))?;

    Ok(Json(ApiResponse::success(EmployeeDto::from(employee))))
}

/// DELETE /api/employees/{id} (manager only)
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageEmployees)?;

    let deleted = state.store().delete_employee(&id).await?;
    if deleted {
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::not_found("Employee", &id))
    }
}
