use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::error;
use utoipa::ToSchema;

use crate::docker::RuntimeError;
use crate::service::{ControllerError, StrategyError, ValidationError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, Option<HashMap<String, serde_json::Value>>) {
        use ControllerError as C;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", None),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", None),
            ApiError::Controller(err) => match err {
                C::Validation(ValidationError::InsufficientMemory { required, available }) => (
                    StatusCode::BAD_REQUEST,
                    "INSUFFICIENT_MEMORY",
                    Some(HashMap::from([
                        ("required".to_string(), json!(required)),
                        ("available".to_string(), json!(available)),
                    ])),
                ),
                C::Validation(ValidationError::MissingRequired(key)) => (
                    StatusCode::BAD_REQUEST,
                    "MISSING_REQUIRED",
                    Some(HashMap::from([("key".to_string(), json!(key))])),
                ),
                C::Validation(ValidationError::InvalidValue { key, value }) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_VALUE",
                    Some(HashMap::from([
                        ("key".to_string(), json!(key)),
                        ("value".to_string(), json!(value)),
                    ])),
                ),
                C::Validation(ValidationError::NoMemoryValue { key, available }) => (
                    StatusCode::BAD_REQUEST,
                    "NO_MEMORY_VALUE",
                    Some(HashMap::from([
                        ("key".to_string(), json!(key)),
                        ("available".to_string(), json!(available)),
                    ])),
                ),
                C::Strategy(StrategyError::Unsupported(_)) => (StatusCode::BAD_REQUEST, "NOT_SUPPORTED", None),
                C::Strategy(StrategyError::Unregistered(_)) | C::UnknownService(_) => {
                    (StatusCode::NOT_FOUND, "UNKNOWN_SERVICE", None)
                }
                C::Conflict | C::Runtime(RuntimeError::Conflict(_)) => (StatusCode::CONFLICT, "CONFLICT", None),
                C::UnboundStrategy => (StatusCode::CONFLICT, "UNBOUND_STRATEGY", None),
                C::Runtime(RuntimeError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND", None),
                C::Runtime(RuntimeError::Transient(_)) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "RUNTIME_UNAVAILABLE", None)
                }
                C::Runtime(RuntimeError::Fatal(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "RUNTIME_ERROR", None),
                C::Catalog(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CATALOG_ERROR", None),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = self.parts();

        let message = match &self {
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::Controller(ControllerError::Runtime(RuntimeError::NotFound(_))) => {
                "no service container exists".to_string()
            }
            ApiError::Controller(err) => err.to_string(),
        };

        if status.is_server_error() {
            error!(code = %code, "Request failed: {}", self);
        }

        let error_response = ErrorResponse {
            error: ErrorDetails {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
