use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing caller input. `field` names the offending input.
    Validation { field: &'static str, message: String },
    NotFound(String),
    CapacityExceeded(String),
    DependencyUnavailable(String),
    Unauthorized(String),
    Internal(String),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::CapacityExceeded(_) => "capacity_exceeded",
            AppError::DependencyUnavailable(_) => "dependency_unavailable",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CapacityExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::DependencyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Internal(e) => {
                tracing::error!("internal error: {e}");
                "internal server error".to_string()
            }
            AppError::DependencyUnavailable(e) => {
                tracing::error!("dependency unavailable: {e}");
                e.clone()
            }
            AppError::Validation { message, .. } => message.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::CapacityExceeded(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation { field, message } => write!(f, "{field}: {message}"),
            AppError::NotFound(msg)
            | AppError::CapacityExceeded(msg)
            | AppError::DependencyUnavailable(msg)
            | AppError::Unauthorized(msg)
            | AppError::Internal(msg) => write!(f, "{}: {msg}", self.code()),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut error = json!({
            "code": self.code(),
            "message": self.message()
        });
        if let AppError::Validation { field, .. } = &self {
            error["field"] = json!(field);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
