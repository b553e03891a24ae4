use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::FieldErrors;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error body returned by every handler.
///
/// Validation failures render as `{"message", "errors"}` with per-field
/// messages; everything else renders as `{"error", "detail"}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
    pub errors: Option<FieldErrors>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail, errors: None }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            title: "Validation Error",
            detail: errors.first_message().map(str::to_string),
            errors: Some(errors),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(detail.into()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(errors) => JsonApiError::validation(errors),
            ServiceError::NotFound(msg) => JsonApiError::not_found(msg),
            ServiceError::Storage(_) => {
                JsonApiError::new(StatusCode::BAD_GATEWAY, "Storage Error", Some(e.to_string()))
            }
            ServiceError::Db(_) => {
                error!(code = e.code(), error = %e, "request failed");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = match self.errors {
            Some(errors) => serde_json::json!({
                "message": self.detail.unwrap_or_else(|| self.title.to_string()),
                "errors": errors,
            }),
            None => serde_json::json!({ "error": self.title, "detail": self.detail }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::storage::BlobError;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_renders_field_errors() {
        let mut fe = FieldErrors::new();
        fe.add("name", "The name field is required.");
        fe.add("stock", "The stock field must be an integer.");
        let resp = JsonApiError::from(ServiceError::Validation(fe)).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let v = body_json(resp).await;
        assert_eq!(v["message"], "The name field is required.");
        assert_eq!(v["errors"]["stock"][0], "The stock field must be an integer.");
    }

    #[tokio::test]
    async fn service_errors_map_to_status() {
        let cases = [
            (ServiceError::not_found("product"), StatusCode::NOT_FOUND),
            (ServiceError::Storage(BlobError::Unavailable("down".into())), StatusCode::BAD_GATEWAY),
            (ServiceError::Db("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let resp = JsonApiError::from(err).into_response();
            assert_eq!(resp.status(), status);
            let v = body_json(resp).await;
            assert!(v["error"].is_string());
            assert!(v["detail"].is_string());
        }
    }
}
