use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get};
use axum::Router;
use serde::Deserialize;

use crate::error::Result;
use crate::models::user::{NewUserRequest, UserDto};
use crate::models::Pagination;
use crate::state::AppState;
use crate::utils::parse_id_list;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/users", get(get_users).post(create_user))
        .route("/admin/users/:user_id", delete(delete_user))
}

#[derive(Debug, Deserialize)]
struct UserListParams {
    ids: Option<String>,
    from: Option<i64>,
    size: Option<i64>,
}

/// GET /admin/users
async fn get_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserListParams>,
) -> Result<Json<Vec<UserDto>>> {
    let ids = params.ids.as_deref().map(|raw| parse_id_list("ids", raw)).transpose()?;
    let page = Pagination::new(params.from, params.size);
    let users = state.user_service.get_users(ids, page).await?;
    Ok(Json(users))
}

/// POST /admin/users
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<UserDto>)> {
    let user = state.user_service.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// DELETE /admin/users/:user_id
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode> {
    state.user_service.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
