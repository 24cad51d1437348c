//! Registration and favorite toggle endpoints.
//!
//! Registrations and favorites share handlers; the engagement kind is fixed
//! per route.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use gather_common::AppResult;
use gather_core::{Engagement, EngagementKind};
use serde::Deserialize;

use crate::endpoints::events::EventResponse;
use crate::{response::ApiResponse, state::AppState};

/// Toggle request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRequest {
    pub user_id: String,
}

async fn set_registration(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<EngagementRequest>,
) -> AppResult<ApiResponse<Engagement>> {
    let engagement = state
        .engagement_service
        .set(EngagementKind::Registration, &event_id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(engagement))
}

async fn clear_registration(
    State(state): State<AppState>,
    Path((event_id, user_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<Engagement>> {
    let engagement = state
        .engagement_service
        .clear(EngagementKind::Registration, &event_id, &user_id)
        .await?;
    Ok(ApiResponse::ok(engagement))
}

async fn set_favorite(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(req): Json<EngagementRequest>,
) -> AppResult<ApiResponse<Engagement>> {
    let engagement = state
        .engagement_service
        .set(EngagementKind::Favorite, &event_id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(engagement))
}

async fn clear_favorite(
    State(state): State<AppState>,
    Path((event_id, user_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<Engagement>> {
    let engagement = state
        .engagement_service
        .clear(EngagementKind::Favorite, &event_id, &user_id)
        .await?;
    Ok(ApiResponse::ok(engagement))
}

/// Active events the user is registered for.
async fn registered_events(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state
        .engagement_service
        .list_active_events(EngagementKind::Registration, &user_id)
        .await?;
    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

/// Active events the user has favorited.
async fn favorite_events(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state
        .engagement_service
        .list_active_events(EngagementKind::Favorite, &user_id)
        .await?;
    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

/// Suggested events for the user, by category interest.
async fn suggestions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state.suggestion_service.suggest_for_user(&user_id).await?;
    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

/// Toggle routes mounted under `/events`.
pub fn event_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/registrations", post(set_registration))
        .route("/{id}/registrations/{user_id}", delete(clear_registration))
        .route("/{id}/favorites", post(set_favorite))
        .route("/{id}/favorites/{user_id}", delete(clear_favorite))
}

/// Per-user listing routes mounted under `/users`.
pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/registrations", get(registered_events))
        .route("/{id}/favorites", get(favorite_events))
        .route("/{id}/suggestions", get(suggestions))
}
