use axum::extract::{Path, State};
use axum::Json;

use crate::db;
use crate::error::AppError;
use crate::middleware::auth::{require_host, HostToken};
use crate::models::report::Report;
use crate::models::DataResponse;
use crate::report;
use crate::state::AppState;

pub async fn get_report(
    state: State<AppState>,
    Path(event_id): Path<String>,
    host: HostToken,
) -> Result<Json<DataResponse<Report>>, AppError> {
    require_host(&state.store, &event_id, &host).await?;
    let event = db::events::get_event(&state.store, &event_id).await?;
    let snapshot = state.store.snapshot(&event_id).await?;
    let report = report::build_report(
        &event,
        &snapshot.invites,
        &snapshot.responses,
        chrono::Utc::now(),
    );
    Ok(Json(DataResponse::new(report)))
}
