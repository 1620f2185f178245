use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, patch};
use axum::Router;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::event::{
    EventFullDto, EventShortDto, EventSort, EventState, NewEventDto, UpdateEventRequest,
};
use crate::models::Pagination;
use crate::routes::client_ip;
use crate::services::event::{AdminEventFilter, PublicEventFilter};
use crate::state::AppState;
use crate::utils::{parse_date_param, parse_id_list, parse_string_list};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(search_events))
        .route("/events/:event_id", get(get_event))
        .route("/users/:user_id/events", get(get_user_events).post(create_event))
        .route(
            "/users/:user_id/events/:event_id",
            get(get_user_event).patch(update_event_by_user),
        )
        .route("/admin/events", get(search_events_admin))
        .route("/admin/events/:event_id", patch(update_event_by_admin))
        .route("/admin/events/:event_id/publish", patch(publish_event))
        .route("/admin/events/:event_id/reject", patch(reject_event))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicSearchParams {
    text: Option<String>,
    categories: Option<String>,
    paid: Option<bool>,
    range_start: Option<String>,
    range_end: Option<String>,
    #[serde(default)]
    only_available: bool,
    sort: Option<String>,
    from: Option<i64>,
    size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminSearchParams {
    users: Option<String>,
    states: Option<String>,
    categories: Option<String>,
    range_start: Option<String>,
    range_end: Option<String>,
    from: Option<i64>,
    size: Option<i64>,
}

fn parse_opt_date(name: &str, raw: Option<&str>) -> Result<Option<NaiveDateTime>> {
    raw.map(|v| parse_date_param(name, v)).transpose()
}

fn parse_opt_ids(name: &str, raw: Option<&str>) -> Result<Option<Vec<i64>>> {
    raw.map(|v| parse_id_list(name, v)).transpose()
}

/// GET /events
async fn search_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PublicSearchParams>,
    headers: HeaderMap,
    addr: ConnectInfo<SocketAddr>,
) -> Result<Json<Vec<EventShortDto>>> {
    debug!("Public event search: {:?}", params);

    let filter = PublicEventFilter {
        text: params.text,
        categories: parse_opt_ids("categories", params.categories.as_deref())?,
        paid: params.paid,
        range_start: parse_opt_date("rangeStart", params.range_start.as_deref())?,
        range_end: parse_opt_date("rangeEnd", params.range_end.as_deref())?,
        only_available: params.only_available,
        sort: EventSort::parse(params.sort.as_deref()),
    };

    let page = Pagination::new(params.from, params.size);
    let events = state.event_service.get_events_public(filter, page).await?;

    state.stats.record_hit("/events", &client_ip(&headers, &addr)).await;
    Ok(Json(events))
}

/// GET /events/:event_id
async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    headers: HeaderMap,
    addr: ConnectInfo<SocketAddr>,
) -> Result<Json<EventFullDto>> {
    let event = state.event_service.get_event_public(event_id).await?;

    state
        .stats
        .record_hit(&format!("/events/{}", event_id), &client_ip(&headers, &addr))
        .await;
    Ok(Json(event))
}

/// POST /users/:user_id/events
async fn create_event(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(request): Json<NewEventDto>,
) -> Result<(StatusCode, Json<EventFullDto>)> {
    let event = state.event_service.create_event(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /users/:user_id/events
async fn get_user_events(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<EventShortDto>>> {
    let events = state.event_service.get_user_events(user_id, page).await?;
    Ok(Json(events))
}

/// GET /users/:user_id/events/:event_id
async fn get_user_event(
    State(state): State<Arc<AppState>>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<EventFullDto>> {
    let event = state.event_service.get_user_event(user_id, event_id).await?;
    Ok(Json(event))
}

/// PATCH /users/:user_id/events/:event_id
async fn update_event_by_user(
    State(state): State<Arc<AppState>>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<EventFullDto>> {
    let event = state.event_service.update_event_by_user(user_id, event_id, request).await?;
    Ok(Json(event))
}

/// GET /admin/events
async fn search_events_admin(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AdminSearchParams>,
) -> Result<Json<Vec<EventFullDto>>> {
    debug!("Admin event search: {:?}", params);

    let states = params
        .states
        .as_deref()
        .map(|raw| {
            parse_string_list(raw)
                .into_iter()
                .map(|s| {
                    s.parse::<EventState>()
                        .map_err(|_| AppError::Validation(format!("Invalid event state: {}", s)))
                })
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?;

    let filter = AdminEventFilter {
        users: parse_opt_ids("users", params.users.as_deref())?,
        states,
        categories: parse_opt_ids("categories", params.categories.as_deref())?,
        range_start: parse_opt_date("rangeStart", params.range_start.as_deref())?,
        range_end: parse_opt_date("rangeEnd", params.range_end.as_deref())?,
    };

    let page = Pagination::new(params.from, params.size);
    let events = state.event_service.get_events_admin(filter, page).await?;
    Ok(Json(events))
}

/// PATCH /admin/events/:event_id
async fn update_event_by_admin(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<EventFullDto>> {
    let event = state.event_service.update_event_by_admin(event_id, request).await?;
    Ok(Json(event))
}

/// PATCH /admin/events/:event_id/publish
async fn publish_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventFullDto>> {
    let event = state.event_service.publish_event(event_id).await?;
    Ok(Json(event))
}

/// PATCH /admin/events/:event_id/reject
async fn reject_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventFullDto>> {
    let event = state.event_service.reject_event(event_id).await?;
    Ok(Json(event))
}
