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
use crate::db::{NewAsset, NewSparePart, SparePartUpdate};
use crate::entities::{assets, spare_parts};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePartDto {
    pub id: String,
    pub name: String,
    pub part_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub stock: i32,
    pub min_stock: i32,
    pub price: f64,
}

impl From<spare_parts::Model> for SparePartDto {
    fn from(model: spare_parts::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            part_number: model.part_number,
            description: model.description,
            stock: model.stock,
            min_stock: model.min_stock,
            price: model.price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDto {
    pub id: String,
    pub serial_number: String,
    pub model_name: String,
    pub status: String,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl From<assets::Model> for AssetDto {
    fn from(model: assets::Model) -> Self {
        Self {
            id: model.id,
            serial_number: model.serial_number,
            model_name: model.model_name,
            status: model.status,
            condition: model.condition,
            location_id: model.location_id,
        }
    }
}

#[derive(Deserialize)]
pub struct ListPartsQuery {
    pub search: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSparePartRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub part_number: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_min_stock")]
    pub min_stock: i32,
    #[serde(default)]
    pub price: f64,
}

const fn default_min_stock() -> i32 {
    5
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSparePartRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub min_stock: Option<i32>,
    pub price: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default = "default_asset_status")]
    pub status: String,
    #[serde(default = "default_asset_condition")]
    pub condition: String,
    pub location_id: Option<String>,
}

fn default_asset_status() -> String {
    "in_service".to_string()
}

fn default_asset_condition() -> String {
    "good".to_string()
}

/// GET /api/spare-parts
pub async fn list_parts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListPartsQuery>,
) -> Result<Json<ApiResponse<Vec<SparePartDto>>>, ApiError> {
    require_session(&state, &headers)?;

    let parts = state.store().list_spare_parts(query.search.as_deref()).await?;
    let dtos: Vec<SparePartDto> = parts.into_iter().map(SparePartDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/spare-parts (manager or maintenance)
pub async fn create_part(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateSparePartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageInventory)?;

    if payload.name.is_empty() || payload.part_number.is_empty() {
        return Err(ApiError::validation("Name and part number are required"));
    }
    if payload.stock < 0 {
        return Err(ApiError::validation("Stock cannot be negative"));
    }

    if state
        .store()
        .spare_part_number_exists(&payload.part_number)
        .await?
    {
        return Err(ApiError::conflict("Part number already exists"));
    }

    let part = state
        .store()
        .create_spare_part(NewSparePart {
            name: payload.name,
            part_number: payload.part_number,
            description: payload.description,
            stock: payload.stock,
            min_stock: payload.min_stock,
            price: payload.price,
        })
        .await
        .map_err(|e| ApiError::from_store(e, "Part number already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SparePartDto::from(part))),
    ))
}

/// GET /api/spare-parts/{id}
pub async fn get_part(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SparePartDto>>, ApiError> {
    require_session(&state, &headers)?;

    let part = state
        .store()
        .get_spare_part(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Spare part", &id))?;

    Ok(Json(ApiResponse::success(SparePartDto::from(part))))
}

/// PUT /api/spare-parts/{id} (manager or maintenance)
pub async fn update_part(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSparePartRequest>,
) -> Result<Json<ApiResponse<SparePartDto>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageInventory)?;

    if matches!(payload.stock, Some(stock) if stock < 0) {
        return Err(ApiError::validation("Stock cannot be negative"));
    }

    let part = state
        .store()
        .update_spare_part(
            &id,
            SparePartUpdate {
                name: payload.name,
                description: payload.description,
                stock: payload.stock,
                min_stock: payload.min_stock,
                price: payload.price,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Spare part", &id))?;

    Ok(Json(ApiResponse::success(SparePartDto::from(part))))
}

/// DELETE /api/spare-parts/{id} (manager or maintenance)
pub async fn delete_part(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageInventory)?;

    let deleted = state.store().delete_spare_part(&id).await?;
    if deleted {
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::not_found("Spare part", &id))
    }
}

/// GET /api/assets
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<AssetDto>>>, ApiError> {
    require_session(&state, &headers)?;

    let assets = state.store().list_assets().await?;
    let dtos: Vec<AssetDto> = assets.into_iter().map(AssetDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /api/assets (manager or maintenance)
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateAssetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_session(&state, &headers)?;
    require_role(&claims, Action::ManageInventory)?;

    if payload.serial_number.is_empty() || payload.model_name.is_empty() {
        return Err(ApiError::validation(
            "serialNumber and modelName are required",
        ));
    }

    let asset = state
        .store()
        .create_asset(NewAsset {
            serial_number: payload.serial_number,
            model_name: payload.model_name,
            status: payload.status,
            condition: payload.condition,
            location_id: payload.location_id,
        })
        .await
        .map_err(|e| ApiError::from_store(e, "Serial number already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AssetDto::from(asset))),
    ))
}
