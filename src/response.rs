use serde::Serialize;

/// Uniform envelope every API response is wrapped in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub success: bool,
    pub error_msg: Option<String>,
    pub error: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            success: true,
            error_msg: None,
            error: None,
        }
    }

    pub fn failure(message: String, error: Option<serde_json::Value>) -> Self {
        Self {
            data: None,
            success: false,
            error_msg: Some(message),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let value = serde_json::to_value(ApiResponse::success(true)).unwrap();
        assert_eq!(
            value,
            json!({ "data": true, "success": true, "errorMsg": null, "error": null })
        );
    }

    #[test]
    fn test_unit_payload_serializes_as_null() {
        let value = serde_json::to_value(ApiResponse::success(())).unwrap();
        assert_eq!(value["data"], json!(null));
        assert_eq!(value["success"], json!(true));
    }
}
