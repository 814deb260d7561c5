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
use crate::db::{ContractUpdate, NewContract};
use crate::entities::{contract_items, service_contracts};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDto {
    pub id: String,
    pub company_id: String,
    pub contract_number: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub status: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<service_contracts::Model> for ContractDto {
    fn from(model: service_contracts::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            contract_number: model.contract_number,
            start_date: model.start_date,
            end_date: model.end_date,
            status: model.status,
            price: model.price,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetailDto {
    #[serde(flatten)]
    pub contract: ContractDto,
    pub asset_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContractsQuery {
    pub status: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractRequest {
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub contract_number: String,
    #[serde(default)]
    pub start_date: String,
    pub end_date: Option<String>,
    #[serde(default = "default_contract_status")]
    pub status: String,
    #[serde(default)]
    pub price: f64,
    pub notes: Option<String>,
    #[serde(default)]
    pub asset_ids: Vec<String>,
}

fn default_contract_status() -> String {
    "draft".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractRequest {
    pub status: Option<String>,
    pub end_date: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
}

/// GET /api/contracts
pub async fn list_contracts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListContractsQuery>,
) -> Result<Json<ApiResponse<Vec<ContractDto>>>, ApiError> {
    require_session(&state, &headers)?;

    let contracts = state
        .store()
        .list_contracts(query.status.as_deref(), query.company_id.as_deref())
        .await?;
    let dtos: Vec<ContractDto> = contracts.into_iter().map(ContractDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/contracts (manager only)
pub async fn create_contract(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateContractRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageContracts)?;

    if payload.company_id.is_empty()
        || payload.contract_number.is_empty()
        || payload.start_date.is_empty()
    {
        return Err(ApiError::validation(
            "companyId, contractNumber and startDate are required",
        ));
    }

    if state.store().get_company(&payload.company_id).await?.is_none() {
        return Err(ApiError::not_found("Company", &payload.company_id));
    }

    if state
        .store()
        .contract_number_exists(&payload.contract_number)
        .await?
    {
        return Err(ApiError::conflict("Contract number already exists"));
    }

    for asset_id in &payload.asset_ids {
        if state.store().get_asset(asset_id).await?.is_none() {
            return Err(ApiError::not_found("Asset", asset_id));
        }
    }

    let contract = state
        .store()
        .create_contract(NewContract {
            company_id: payload.company_id,
            contract_number: payload.contract_number,
            start_date: payload.start_date,
            end_date: payload.end_date,
            status: payload.status,
            price: payload.price,
            notes: payload.notes,
            asset_ids: payload.asset_ids,
        })
        .await
        .map_err(|e| ApiError::from_store(e, "Contract number already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ContractDto::from(contract))),
    ))
}

/// GET /api/contracts/{id}
pub async fn get_contract(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ContractDetailDto>>, ApiError> {
    require_session(&state, &headers)?;

    let (contract, items) = state
        .store()
        .get_contract(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contract", &id))?;

    Ok(Json(ApiResponse::success(ContractDetailDto {
        contract: ContractDto::from(contract),
        asset_ids: items
            .into_iter()
            .map(|item: contract_items::Model| item.asset_id)
            .collect(),
    })))
}

/// PUT /api/contracts/{id} (manager only)
pub async fn update_contract(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateContractRequest>,
) -> Result<Json<ApiResponse<ContractDto>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageContracts)?;

    let contract = state
        .store()
        .update_contract(
            &id,
            ContractUpdate {
                status: payload.status,
                end_date: payload.end_date,
                price: payload.price,
                notes: payload.notes,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Contract", &id))?;

    Ok(Json(ApiResponse::success(ContractDto::from(contract))))
}

/// DELETE /api/contracts/{id} (manager only)
pub async fn delete_contract(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageContracts)?;

    let deleted = state.store().delete_contract(&id).await?;
    if deleted {
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::not_found("Contract", &id))
    }
}
