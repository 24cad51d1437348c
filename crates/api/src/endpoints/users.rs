//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use gather_common::AppResult;
use gather_core::{CreateUserInput, LoginInput};
use gather_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{response::ApiResponse, state::AppState};

/// User response. The password hash never leaves the service layer.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role_id: String,
    pub canceled: bool,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role_id: user.role_id,
            canceled: user.canceled,
        }
    }
}

/// Delete request, naming who is asking.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    pub requester_id: String,
}

/// List active users.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.list().await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Get an active user by id.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Create a user account.
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.create(input).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Verify credentials.
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.login(input).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Soft-delete a user. Admin only.
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DeleteUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.cancel(&id, &req.requester_id).await?;
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/login", post(login))
        .route("/{id}", get(show).delete(remove))
}
