use super::ApiJson;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::storage::types::ItemResult;
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TransferItemsRequest {
    path: String,
    #[serde(default)]
    filenames: Vec<String>,
    destination: String,
}

#[derive(Deserialize)]
pub struct RemoveItemsRequest {
    path: String,
    #[serde(default)]
    filenames: Vec<String>,
}

#[derive(Deserialize)]
pub struct MoveItemRequest {
    path: String,
    destination: String,
}

pub async fn copy_items(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TransferItemsRequest>,
) -> Result<Json<ApiResponse<Vec<ItemResult>>>, AppError> {
    let results = state
        .storage
        .copy_items(&req.path, &req.filenames, &req.destination)
        .await?;
    Ok(Json(ApiResponse::success(results)))
}

pub async fn move_items(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TransferItemsRequest>,
) -> Result<Json<ApiResponse<Vec<ItemResult>>>, AppError> {
    let results = state
        .storage
        .move_items(&req.path, &req.filenames, &req.destination)
        .await?;
    Ok(Json(ApiResponse::success(results)))
}

pub async fn move_item(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<MoveItemRequest>,
) -> Result<Json<ApiResponse<ItemResult>>, AppError> {
    let result = state.storage.move_item(&req.path, &req.destination).await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn remove_items(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RemoveItemsRequest>,
) -> Result<Json<ApiResponse<Vec<ItemResult>>>, AppError> {
    let results = state
        .storage
        .remove_items(&req.path, &req.filenames)
        .await?;
    Ok(Json(ApiResponse::success(results)))
}
