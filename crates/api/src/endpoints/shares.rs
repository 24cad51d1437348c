//! Event share endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use gather_common::AppResult;
use gather_db::entities::share;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{response::ApiResponse, state::AppState};

/// Share request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub sharer_user_id: String,

    #[validate(email)]
    pub recipient_address: String,
}

/// Share response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub id: String,
    pub event_id: String,
    pub sharer_user_id: String,
    pub recipient_address: String,
}

impl From<share::Model> for ShareResponse {
    fn from(share: share::Model) -> Self {
        Self {
            id: share.id,
            event_id: share.event_id,
            sharer_user_id: share.sharer_user_id,
            recipient_address: share.recipient_address,
        }
    }
}

/// Email an event to someone and record the share.
async fn create(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<ShareRequest>,
) -> AppResult<ApiResponse<ShareResponse>> {
    req.validate()?;

    let share = state
        .share_service
        .share_event(&event_id, &req.sharer_user_id, &req.recipient_address)
        .await?;
    Ok(ApiResponse::ok(share.into()))
}

/// Share routes mounted under `/events`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/shares", post(create))
}
