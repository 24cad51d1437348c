//! API endpoints.

mod engagement;
mod events;
mod roles;
mod shares;
mod users;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "active": true }))
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .nest("/roles", roles::router())
        .nest("/users", users::router().merge(engagement::user_router()))
        .nest(
            "/events",
            events::router()
                .merge(engagement::event_router())
                .merge(shares::router()),
        )
}
