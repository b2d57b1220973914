use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::{events, Store};
use crate::error::AppError;
use crate::state::AppState;

/// Bearer token presented by a host. Which event it unlocks is checked by
/// [`require_host`] once the handler knows the event.
#[derive(Debug, Clone)]
pub struct HostToken(pub String);

/// Rejection type for when the header is missing or malformed.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": "unauthorized",
                "message": "invalid or missing authentication"
            }
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl FromRequestParts<AppState> for HostToken {
    type Rejection = AuthRejection;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        async move { token.map(HostToken).ok_or(AuthRejection) }
    }
}

/// Fails with `Unauthorized` unless `token` is the host token of `event_id`.
/// An unknown event yields `NotFound`.
pub async fn require_host(store: &Store, event_id: &str, token: &HostToken) -> Result<(), AppError> {
    if events::verify_host(store, event_id, &token.0).await? {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "not the host of this event".to_string(),
        ))
    }
}
