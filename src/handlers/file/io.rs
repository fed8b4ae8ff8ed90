use super::{ApiJson, ApiQuery};
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::utils::common::{attachment_disposition, mime_guess};
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

#[derive(Deserialize)]
pub struct CreateDirRequest {
    path: String,
    directory: String,
}

pub async fn create_dir(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateDirRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.storage.create_dir(&req.path, &req.directory).await?;
    Ok(Json(ApiResponse::success(())))
}

#[derive(Deserialize)]
pub struct ReadFileParams {
    path: String,
}

pub async fn read_file(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<ReadFileParams>,
) -> Result<Response, AppError> {
    let opened = state.storage.open_file(&params.path).await?;

    let filename = opened
        .path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let headers = [
        (header::CONTENT_TYPE, mime_guess(&opened.path).to_string()),
        (header::CONTENT_LENGTH, opened.size.to_string()),
        (header::CONTENT_DISPOSITION, attachment_disposition(&filename)),
    ];
    let body = Body::from_stream(ReaderStream::new(opened.file));

    Ok((headers, body).into_response())
}
