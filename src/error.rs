use crate::response::ApiResponse;
use crate::storage::types::{ErrorDetail, ItemResult};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Path escapes the storage root: {0}")]
    Resolution(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}: {source}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{message}")]
    ItemFailure {
        message: String,
        failure: Box<ItemResult>,
    },
}

impl AppError {
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            message: message.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Resolution(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Io { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
                std::io::ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::ItemFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Io { source, .. } => serde_json::to_value(ErrorDetail::from(source)).ok(),
            AppError::ItemFailure { failure, .. } => serde_json::to_value(failure).ok(),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Io { message, .. } | AppError::ItemFailure { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = Json(ApiResponse::<()>::failure(self.message(), self.detail()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_already_exists_envelope() {
        let (status, body) = render(AppError::AlreadyExists("The folder already exists".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({
                "data": null,
                "success": false,
                "errorMsg": "The folder already exists",
                "error": null,
            })
        );
    }

    #[tokio::test]
    async fn test_io_error_maps_kind_to_status() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let (status, body) = render(AppError::io("Cannot read that folder", source)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorMsg"], json!("Cannot read that folder"));
        assert_eq!(body["error"]["kind"], json!("NotFound"));

        let source = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let (status, _) = render(AppError::io("Unknown error creating folder", source)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_resolution_is_forbidden() {
        let (status, body) = render(AppError::Resolution("../etc".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], json!(false));
    }
}
