//! Event endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use gather_common::AppResult;
use gather_core::{CreateEventInput, EventMetrics, UpdateEventInput};
use gather_db::entities::event;
use serde::{Deserialize, Serialize};

use crate::{response::ApiResponse, state::AppState};

/// Event response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub cost: String,
    pub start_time: String,
    pub end_time: String,
    pub event_link: Option<String>,
    pub creator_id: String,
    pub updated_at: String,
    pub canceled: bool,
}

impl From<event::Model> for EventResponse {
    fn from(event: event::Model) -> Self {
        Self {
            id: event.id,
            description: event.description,
            category: event.category,
            location: event.location,
            cost: event.cost,
            start_time: event.start_time.to_rfc3339(),
            end_time: event.end_time.to_rfc3339(),
            event_link: event.event_link,
            creator_id: event.creator_id,
            updated_at: event.updated_at.to_rfc3339(),
            canceled: event.canceled,
        }
    }
}

/// Delete request, naming who is asking.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventRequest {
    pub requester_id: String,
}

/// List active events, soonest first.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state.event_service.list().await?;
    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

/// Get an active event by id.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.get(&id).await?;
    Ok(ApiResponse::ok(event.into()))
}

/// Create an event.
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateEventInput>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.create(input).await?;
    Ok(ApiResponse::ok(event.into()))
}

/// Update an event. Creator or Admin only.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateEventInput>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.update(&id, input).await?;
    Ok(ApiResponse::ok(event.into()))
}

/// Soft-delete an event. Creator or Admin only.
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DeleteEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.cancel(&id, &req.requester_id).await?;
    Ok(ApiResponse::ok(event.into()))
}

/// Engagement metrics for one event.
async fn metrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<EventMetrics>> {
    let metrics = state.metrics_service.for_event(&id).await?;
    Ok(ApiResponse::ok(metrics))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).patch(update).delete(remove))
        .route("/{id}/metrics", get(metrics))
}
