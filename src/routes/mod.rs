mod events;
mod health;
mod invites;
mod reports;
mod responses;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/version", get(health::version))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Events
        .route("/events", post(events::create_event))
        .route(
            "/events/{event_id}",
            get(events::get_event).patch(events::update_event),
        )
        // Invites (host)
        .route(
            "/events/{event_id}/invites",
            get(invites::list_invites).post(invites::create_invites),
        )
        // Invites (guest lookup) and deactivation
        .route("/invites/{invite_id}", get(invites::get_invite))
        .route(
            "/invites/{invite_id}/deactivate",
            post(invites::deactivate_invite),
        )
        // RSVP submission is public
        .route("/events/{event_id}/rsvp", post(responses::submit_rsvp))
        .route(
            "/events/{event_id}/responses",
            get(responses::list_responses),
        )
        // Dashboard
        .route("/events/{event_id}/report", get(reports::get_report))
}
