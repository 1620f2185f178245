use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch, post};
use axum::Router;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::comment::{
    CommentAdminUpdateDto, CommentDto, CommentSort, CommentStatus, LikeType, NewCommentDto,
    UpdateCommentDto,
};
use crate::models::Pagination;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/:event_id/comments", get(get_event_comments))
        .route("/users/:user_id/comments", get(get_user_comments).post(create_comment))
        .route(
            "/users/:user_id/comments/:comment_id",
            patch(update_comment).delete(delete_comment),
        )
        .route(
            "/users/:user_id/comments/:comment_id/like",
            post(like_comment).delete(remove_reaction),
        )
        .route("/users/:user_id/comments/:comment_id/dislike", post(dislike_comment))
        .route("/admin/comments", get(get_comments_admin))
        .route(
            "/admin/comments/:comment_id",
            patch(moderate_comment).delete(delete_comment_by_admin),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentParams {
    event_id: i64,
}

#[derive(Debug, Deserialize)]
struct EventCommentParams {
    sort: Option<String>,
    from: Option<i64>,
    size: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AdminCommentParams {
    status: Option<String>,
    from: Option<i64>,
    size: Option<i64>,
}

/// POST /users/:user_id/comments?eventId=
async fn create_comment(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<CreateCommentParams>,
    Json(request): Json<NewCommentDto>,
) -> Result<(StatusCode, Json<CommentDto>)> {
    let comment = state
        .comment_service
        .create_comment(user_id, params.event_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /users/:user_id/comments/:comment_id
async fn update_comment(
    State(state): State<Arc<AppState>>,
    Path((user_id, comment_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateCommentDto>,
) -> Result<Json<CommentDto>> {
    let comment = state.comment_service.update_comment(user_id, comment_id, request).await?;
    Ok(Json(comment))
}

/// DELETE /users/:user_id/comments/:comment_id
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path((user_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    state.comment_service.delete_comment(user_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/:user_id/comments
async fn get_user_comments(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<CommentDto>>> {
    let comments = state.comment_service.get_user_comments(user_id, page).await?;
    Ok(Json(comments))
}

/// GET /events/:event_id/comments
async fn get_event_comments(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Query(params): Query<EventCommentParams>,
) -> Result<Json<Vec<CommentDto>>> {
    let sort = CommentSort::parse(params.sort.as_deref());
    let page = Pagination::new(params.from, params.size);
    let comments = state.comment_service.get_event_comments(event_id, sort, page).await?;
    Ok(Json(comments))
}

/// POST /users/:user_id/comments/:comment_id/like
async fn like_comment(
    State(state): State<Arc<AppState>>,
    Path((user_id, comment_id)): Path<(i64, i64)>,
) -> Result<Json<CommentDto>> {
    let comment = state.comment_service.add_reaction(user_id, comment_id, LikeType::Like).await?;
    Ok(Json(comment))
}

/// POST /users/:user_id/comments/:comment_id/dislike
async fn dislike_comment(
    State(state): State<Arc<AppState>>,
    Path((user_id, comment_id)): Path<(i64, i64)>,
) -> Result<Json<CommentDto>> {
    let comment = state
        .comment_service
        .add_reaction(user_id, comment_id, LikeType::Dislike)
        .await?;
    Ok(Json(comment))
}

/// DELETE /users/:user_id/comments/:comment_id/like
async fn remove_reaction(
    State(state): State<Arc<AppState>>,
    Path((user_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    state.comment_service.remove_reaction(user_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/comments
async fn get_comments_admin(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AdminCommentParams>,
) -> Result<Json<Vec<CommentDto>>> {
    let status = params
        .status
        .as_deref()
        .map(|raw| {
            raw.parse::<CommentStatus>()
                .map_err(|_| AppError::Validation(format!("Invalid comment status: {}", raw)))
        })
        .transpose()?;
    let page = Pagination::new(params.from, params.size);
    let comments = state.comment_service.get_comments_admin(status, page).await?;
    Ok(Json(comments))
}

/// PATCH /admin/comments/:comment_id
async fn moderate_comment(
    State(state): State<Arc<AppState>>,
    Path(comment_id): Path<i64>,
    Json(request): Json<CommentAdminUpdateDto>,
) -> Result<Json<CommentDto>> {
    let comment = state.comment_service.moderate_comment(comment_id, request).await?;
    Ok(Json(comment))
}

/// DELETE /admin/comments/:comment_id
async fn delete_comment_by_admin(
    State(state): State<Arc<AppState>>,
    Path(comment_id): Path<i64>,
) -> Result<StatusCode> {
    state.comment_service.delete_comment_by_admin(comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
