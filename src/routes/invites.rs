use axum::extract::{Path, State};
use axum::Json;

use crate::db;
use crate::error::AppError;
use crate::middleware::auth::{require_host, HostToken};
use crate::models::invite::{CreateInvites, Invite};
use crate::models::DataResponse;
use crate::state::AppState;

/// Personalized when `guests` is present, otherwise `count` anonymous invites.
pub async fn create_invites(
    state: State<AppState>,
    Path(event_id): Path<String>,
    host: HostToken,
    Json(input): Json<CreateInvites>,
) -> Result<Json<DataResponse<Vec<Invite>>>, AppError> {
    require_host(&state.store, &event_id, &host).await?;

    let invites = match (input.guests, input.count) {
        (Some(guests), _) => {
            db::invites::create_personalized(
                &state.store,
                &event_id,
                &guests,
                state.max_batch,
                &state.resolver,
                input.prefer_external_hosting,
            )
            .await?
        }
        (None, Some(count)) => {
            db::invites::create_batch(
                &state.store,
                &event_id,
                count,
                state.max_batch,
                &state.resolver,
                input.prefer_external_hosting,
            )
            .await?
        }
        (None, None) => {
            return Err(AppError::validation(
                "count",
                "either count or guests is required",
            ))
        }
    };
    Ok(Json(DataResponse::new(invites)))
}

pub async fn list_invites(
    state: State<AppState>,
    Path(event_id): Path<String>,
    host: HostToken,
) -> Result<Json<DataResponse<Vec<Invite>>>, AppError> {
    require_host(&state.store, &event_id, &host).await?;
    let invites = db::invites::list_event_invites(&state.store, &event_id).await?;
    Ok(Json(DataResponse::new(invites)))
}

pub async fn get_invite(
    state: State<AppState>,
    Path(invite_id): Path<String>,
) -> Result<Json<DataResponse<Invite>>, AppError> {
    // Public: the invite id is the capability a guest holds.
    let invite = db::invites::get_invite(&state.store, &invite_id).await?;
    Ok(Json(DataResponse::new(invite)))
}

pub async fn deactivate_invite(
    state: State<AppState>,
    Path(invite_id): Path<String>,
    host: HostToken,
) -> Result<Json<DataResponse<Invite>>, AppError> {
    let invite = db::invites::get_invite(&state.store, &invite_id).await?;
    require_host(&state.store, &invite.event_id, &host).await?;
    let invite = db::invites::deactivate_invite(&state.store, &invite_id).await?;
    Ok(Json(DataResponse::new(invite)))
}
