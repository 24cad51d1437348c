//! Role endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use gather_common::AppResult;
use gather_core::CreateRoleInput;
use gather_db::entities::role;
use serde::Serialize;

use crate::{response::ApiResponse, state::AppState};

/// Role response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub canceled: bool,
}

impl From<role::Model> for RoleResponse {
    fn from(role: role::Model) -> Self {
        Self {
            id: role.id,
            name: role.name,
            canceled: role.canceled,
        }
    }
}

/// List active roles.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<RoleResponse>>> {
    let roles = state.role_service.list().await?;
    Ok(ApiResponse::ok(roles.into_iter().map(Into::into).collect()))
}

/// Get a role by id.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RoleResponse>> {
    let role = state.role_service.get(&id).await?;
    Ok(ApiResponse::ok(role.into()))
}

/// Create a role.
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRoleInput>,
) -> AppResult<ApiResponse<RoleResponse>> {
    let role = state.role_service.create(input).await?;
    Ok(ApiResponse::ok(role.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
}
