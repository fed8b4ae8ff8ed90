use super::ApiQuery;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::storage::types::DirectoryEntry;
use crate::utils::path::ROOT_MARKER;
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ListFilesParams {
    path: Option<String>,
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<ListFilesParams>,
) -> Result<Json<ApiResponse<Vec<DirectoryEntry>>>, AppError> {
    let path = params.path.as_deref().unwrap_or(ROOT_MARKER);
    let entries = state.storage.list(path).await?;
    Ok(Json(ApiResponse::success(entries)))
}
