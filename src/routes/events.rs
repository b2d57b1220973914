use axum::extract::{Path, State};
use axum::Json;

use crate::db;
use crate::error::AppError;
use crate::middleware::auth::{require_host, HostToken};
use crate::models::event::{CreateEvent, CreatedEvent, Event, UpdateEvent};
use crate::models::DataResponse;
use crate::state::AppState;

pub async fn create_event(
    state: State<AppState>,
    Json(input): Json<CreateEvent>,
) -> Result<Json<DataResponse<CreatedEvent>>, AppError> {
    let (event, host_token) = db::events::create_event(&state.store, &input).await?;
    Ok(Json(DataResponse::new(CreatedEvent { event, host_token })))
}

pub async fn get_event(
    state: State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<DataResponse<Event>>, AppError> {
    let event = db::events::get_event(&state.store, &event_id).await?;
    Ok(Json(DataResponse::new(event)))
}

pub async fn update_event(
    state: State<AppState>,
    Path(event_id): Path<String>,
    host: HostToken,
    Json(input): Json<UpdateEvent>,
) -> Result<Json<DataResponse<Event>>, AppError> {
    require_host(&state.store, &event_id, &host).await?;
    let event = db::events::update_event(&state.store, &event_id, &input).await?;
    Ok(Json(DataResponse::new(event)))
}
