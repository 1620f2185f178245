use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch};
use axum::Router;
use serde::Deserialize;

use crate::error::Result;
use crate::models::request::{
    EventRequestStatusUpdateRequest, EventRequestStatusUpdateResult, ParticipationRequestDto,
};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/:user_id/requests", get(get_user_requests).post(create_request))
        .route("/users/:user_id/requests/:request_id/cancel", patch(cancel_request))
        .route(
            "/users/:user_id/events/:event_id/requests",
            get(get_event_requests).patch(update_request_statuses),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequestParams {
    event_id: i64,
}

/// POST /users/:user_id/requests?eventId=
async fn create_request(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<CreateRequestParams>,
) -> Result<(StatusCode, Json<ParticipationRequestDto>)> {
    let request = state.request_service.create_request(user_id, params.event_id).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /users/:user_id/requests
async fn get_user_requests(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<ParticipationRequestDto>>> {
    let requests = state.request_service.get_user_requests(user_id).await?;
    Ok(Json(requests))
}

/// PATCH /users/:user_id/requests/:request_id/cancel
async fn cancel_request(
    State(state): State<Arc<AppState>>,
    Path((user_id, request_id)): Path<(i64, i64)>,
) -> Result<Json<ParticipationRequestDto>> {
    let request = state.request_service.cancel_request(user_id, request_id).await?;
    Ok(Json(request))
}

/// GET /users/:user_id/events/:event_id/requests
async fn get_event_requests(
    State(state): State<Arc<AppState>>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<ParticipationRequestDto>>> {
    let requests = state.request_service.get_event_requests(user_id, event_id).await?;
    Ok(Json(requests))
}

/// PATCH /users/:user_id/events/:event_id/requests
async fn update_request_statuses(
    State(state): State<Arc<AppState>>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    Json(update): Json<EventRequestStatusUpdateRequest>,
) -> Result<Json<EventRequestStatusUpdateResult>> {
    let result = state.request_service.update_request_statuses(user_id, event_id, update).await?;
    Ok(Json(result))
}
