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
use crate::auth::policy::Action;
use crate::db::{CompanyUpdate, NewCompany, NewLocation};
use crate::entities::{companies, locations};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
    pub id: String,
    pub company_id: String,
    pub code: String,
    pub name: String,
    pub status: String,
    pub address: String,
    pub district: String,
    pub province: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl From<locations::Model> for LocationDto {
    fn from(model: locations::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            code: model.code,
            name: model.name,
            status: model.status,
            address: model.address,
            district: model.district,
            province: model.province,
            region: model.region,
            lat: model.lat,
            lng: model.lng,
            customer_type: model.customer_type,
            owner_name: model.owner_name,
            owner_phone: model.owner_phone,
            assigned_to: model.assigned_to,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub status: String,
    pub locations: Vec<LocationDto>,
    pub created_at: String,
    pub updated_at: String,
}

impl CompanyDto {
    fn from_parts(company: companies::Model, locations: Vec<locations::Model>) -> Self {
        Self {
            id: company.id,
            name: company.name,
            tax_id: company.tax_id,
            grade: company.grade,
            status: company.status,
            locations: locations.into_iter().map(LocationDto::from).collect(),
            created_at: company.created_at,
            updated_at: company.updated_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_location_status")]
    pub status: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub province: String,
    pub region: Option<String>,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    pub customer_type: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub assigned_to: Option<String>,
}

fn default_location_status() -> String {
    "lead".to_string()
}

impl From<CreateLocationRequest> for NewLocation {
    fn from(req: CreateLocationRequest) -> Self {
        Self {
            code: req.code,
            name: req.name,
            status: req.status,
            address: req.address,
            district: req.district,
            province: req.province,
            region: req.region,
            lat: req.lat,
            lng: req.lng,
            customer_type: req.customer_type,
            owner_name: req.owner_name,
            owner_phone: req.owner_phone,
            assigned_to: req.assigned_to,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    #[serde(default)]
    pub name: String,
    pub tax_id: Option<String>,
    pub grade: Option<String>,
    #[serde(default = "default_company_status")]
    pub status: String,
    #[serde(default)]
    pub locations: Vec<CreateLocationRequest>,
}

fn default_company_status() -> String {
    "lead".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub grade: Option<String>,
    pub status: Option<String>,
}

/// GET /api/companies
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<CompanyDto>>>, ApiError> {
    require_session(&state, &headers)?;

    let companies = state.store().list_companies().await?;
    let dtos: Vec<CompanyDto> = companies
        .into_iter()
        .map(|(company, locations)| CompanyDto::from_parts(company, locations))
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/companies
pub async fn create_company(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_session(&state, &headers)?;

    if payload.name.is_empty() {
        return Err(ApiError::validation("Company name is required"));
    }

    let (company, locations) = state
        .store()
        .create_company(NewCompany {
            name: payload.name,
            tax_id: payload.tax_id,
            grade: payload.grade,
            status: payload.status,
            locations: payload.locations.into_iter().map(NewLocation::from).collect(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CompanyDto::from_parts(
            company, locations,
        ))),
    ))
}

/// GET /api/companies/{id}
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CompanyDto>>, ApiError> {
    require_session(&state, &headers)?;

    let (company, locations) = state
        .store()
        .get_company(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company", &id))?;

    Ok(Json(ApiResponse::success(CompanyDto::from_parts(
        company, locations,
    ))))
}

/// PUT /api/companies/{id}
pub async fn update_company(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<Json<ApiResponse<CompanyDto>>, ApiError> {
    require_session(&state, &headers)?;

    let company = state
        .store()
        .update_company(
            &id,
            CompanyUpdate {
                name: payload.name,
                tax_id: payload.tax_id,
                grade: payload.grade,
                status: payload.status,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Company", &id))?;

    let (company, locations) = state
        .store()
        .get_company(&company.id)
        .await?
        .ok_or_else(|| ApiError::internal("Company vanished during update"))?;

    Ok(Json(ApiResponse::success(CompanyDto::from_parts(
        company, locations,
    ))))
}

/// DELETE /api/companies/{id} (manager only)
pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::DeleteCustomers)?;

    let deleted = state.store().delete_company(&id).await?;
    if deleted {
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::not_found("Company", &id))
    }
}

/// POST /api/companies/{id}/locations
pub async fn add_location(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_session(&state, &headers)?;

    if payload.name.is_empty() || payload.code.is_empty() {
        return Err(ApiError::validation("Location name and code are required"));
    }

    let location = state
        .store()
        .add_location(&id, NewLocation::from(payload))
        .await?
        .ok_or_else(|| ApiError::not_found("Company", &id))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(LocationDto::from(location))),
    ))
}
