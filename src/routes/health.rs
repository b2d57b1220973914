use axum::extract::State;
use axum::Json;

use crate::state::AppState;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn version(state: State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "git_sha": option_env!("RSVP_GIT_SHA").unwrap_or("unknown"),
        "persistence": if state.store.is_persistent() { "sqlite" } else { "memory" },
        "external_hosting": state.resolver.has_external_host(),
    }))
}
