use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::db;
use crate::error::AppError;
use crate::middleware::auth::{require_host, HostToken};
use crate::models::response::{Response, ResponseFilter, SubmitRsvp};
use crate::models::DataResponse;
use crate::state::AppState;

pub async fn submit_rsvp(
    state: State<AppState>,
    Path(event_id): Path<String>,
    Json(input): Json<SubmitRsvp>,
) -> Result<Json<DataResponse<Response>>, AppError> {
    let response = db::responses::submit_response(&state.store, &event_id, &input).await?;
    Ok(Json(DataResponse::new(response)))
}

pub async fn list_responses(
    state: State<AppState>,
    Path(event_id): Path<String>,
    host: HostToken,
    filter: Result<Query<ResponseFilter>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<Response>>>, AppError> {
    require_host(&state.store, &event_id, &host).await?;
    let Query(filter) = filter.map_err(|e| AppError::validation("filter", e.body_text()))?;
    let responses = db::responses::filter_responses(&state.store, &event_id, &filter).await?;
    Ok(Json(DataResponse::new(responses)))
}
