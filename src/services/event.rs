use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::event::{
    AdminStateAction, Event, EventFullDto, EventRecord, EventShortDto, EventSort, EventState,
    NewEventDto, UpdateEventRequest, UserStateAction,
};
use crate::models::Pagination;
use crate::services::stats_client::{event_views, ViewTracker};

/// Base read query; every DTO mapping needs the joined category and
/// initiator names.
pub(crate) const EVENT_SELECT: &str = "SELECT e.id, e.annotation, e.category_id, e.confirmed_requests, \
     e.created_on, e.description, e.event_date, e.initiator_id, e.lat, e.lon, e.paid, \
     e.participant_limit, e.published_on, e.request_moderation, e.state, e.title, \
     c.name AS category_name, u.name AS initiator_name \
     FROM events e \
     JOIN categories c ON c.id = e.category_id \
     JOIN users u ON u.id = e.initiator_id";

#[derive(Debug, Clone, Default)]
pub struct PublicEventFilter {
    pub text: Option<String>,
    pub categories: Option<Vec<i64>>,
    pub paid: Option<bool>,
    pub range_start: Option<NaiveDateTime>,
    pub range_end: Option<NaiveDateTime>,
    pub only_available: bool,
    pub sort: EventSort,
}

#[derive(Debug, Clone, Default)]
pub struct AdminEventFilter {
    pub users: Option<Vec<i64>>,
    pub states: Option<Vec<EventState>>,
    pub categories: Option<Vec<i64>>,
    pub range_start: Option<NaiveDateTime>,
    pub range_end: Option<NaiveDateTime>,
}

#[derive(Clone)]
pub struct EventService {
    pool: PgPool,
    stats: Arc<dyn ViewTracker>,
}

impl EventService {
    pub fn new(pool: PgPool, stats: Arc<dyn ViewTracker>) -> Self {
        Self { pool, stats }
    }

    pub async fn create_event(&self, user_id: i64, request: NewEventDto) -> Result<EventFullDto> {
        request.validate()?;

        let now = Local::now().naive_local();
        ensure_event_date_margin(request.event_date, now, CREATE_MARGIN_HOURS)?;

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound(format!("User with id={} was not found", user_id)));
        }

        let category_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(request.category)
                .fetch_one(&self.pool)
                .await?;
        if !category_exists {
            return Err(AppError::NotFound(format!(
                "Category with id={} was not found",
                request.category
            )));
        }

        let event_id: i64 = sqlx::query_scalar(
            "INSERT INTO events (annotation, category_id, confirmed_requests, created_on, \
             description, event_date, initiator_id, lat, lon, paid, participant_limit, \
             request_moderation, state, title) \
             VALUES ($1, $2, 0, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING id",
        )
        .bind(&request.annotation)
        .bind(request.category)
        .bind(now)
        .bind(&request.description)
        .bind(request.event_date)
        .bind(user_id)
        .bind(request.location.lat)
        .bind(request.location.lon)
        .bind(request.paid)
        .bind(request.participant_limit)
        .bind(request.request_moderation)
        .bind(EventState::Pending)
        .bind(&request.title)
        .fetch_one(&self.pool)
        .await?;

        info!("Created event with id: {} for user: {}", event_id, user_id);

        let record = self.require_record(event_id).await?;
        self.into_full_dto(record).await
    }

    pub async fn get_user_events(&self, user_id: i64, page: Pagination) -> Result<Vec<EventShortDto>> {
        let (limit, offset) = page.limit_offset()?;

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound(format!("User with id={} was not found", user_id)));
        }

        let records = sqlx::query_as::<_, EventRecord>(&format!(
            "{} WHERE e.initiator_id = $1 ORDER BY e.id LIMIT $2 OFFSET $3",
            EVENT_SELECT
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(self.into_short_dtos(records).await)
    }

    pub async fn get_user_event(&self, user_id: i64, event_id: i64) -> Result<EventFullDto> {
        let record = sqlx::query_as::<_, EventRecord>(&format!(
            "{} WHERE e.id = $1 AND e.initiator_id = $2",
            EVENT_SELECT
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id={} was not found", event_id)))?;

        self.into_full_dto(record).await
    }

    pub async fn update_event_by_user(
        &self,
        user_id: i64,
        event_id: i64,
        request: UpdateEventRequest,
    ) -> Result<EventFullDto> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let mut event = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE id = $1 AND initiator_id = $2 FOR UPDATE",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id={} was not found", event_id)))?;

        if event.state == EventState::Published {
            return Err(AppError::conflict("Only pending or canceled events can be changed"));
        }

        let now = Local::now().naive_local();
        if let Some(event_date) = request.event_date {
            ensure_event_date_margin(event_date, now, CREATE_MARGIN_HOURS)?;
        }

        if let Some(action) = request.state_action.as_deref() {
            event.state = apply_user_state_action(action)?;
        }

        self.apply_patch(&mut tx, &mut event, &request).await?;
        persist_event(&mut tx, &event).await?;
        tx.commit().await?;

        let record = self.require_record(event_id).await?;
        self.into_full_dto(record).await
    }

    pub async fn update_event_by_admin(
        &self,
        event_id: i64,
        request: UpdateEventRequest,
    ) -> Result<EventFullDto> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let mut event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id={} was not found", event_id)))?;

        let now = Local::now().naive_local();
        if let Some(event_date) = request.event_date {
            ensure_event_date_margin(event_date, now, PUBLISH_MARGIN_HOURS)?;
        }

        if let Some(action) = request.state_action.as_deref() {
            let effective_date = request.event_date.unwrap_or(event.event_date);
            let (state, published_on) =
                apply_admin_state_action(event.state, effective_date, action, now)?;
            event.state = state;
            if published_on.is_some() {
                event.published_on = published_on;
            }
        }

        self.apply_patch(&mut tx, &mut event, &request).await?;
        persist_event(&mut tx, &event).await?;
        tx.commit().await?;

        let record = self.require_record(event_id).await?;
        self.into_full_dto(record).await
    }

    pub async fn publish_event(&self, event_id: i64) -> Result<EventFullDto> {
        let mut tx = self.pool.begin().await?;

        let mut event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id={} was not found", event_id)))?;

        let now = Local::now().naive_local();
        let (state, published_on) = apply_admin_state_action(
            event.state,
            event.event_date,
            AdminStateAction::PublishEvent.as_str(),
            now,
        )?;
        event.state = state;
        event.published_on = published_on;

        persist_event(&mut tx, &event).await?;
        tx.commit().await?;

        info!("Published event with id: {}", event_id);

        let record = self.require_record(event_id).await?;
        self.into_full_dto(record).await
    }

    pub async fn reject_event(&self, event_id: i64) -> Result<EventFullDto> {
        let mut tx = self.pool.begin().await?;

        let mut event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id={} was not found", event_id)))?;

        let now = Local::now().naive_local();
        let (state, _) = apply_admin_state_action(
            event.state,
            event.event_date,
            AdminStateAction::RejectEvent.as_str(),
            now,
        )?;
        event.state = state;

        persist_event(&mut tx, &event).await?;
        tx.commit().await?;

        info!("Rejected event with id: {}", event_id);

        let record = self.require_record(event_id).await?;
        self.into_full_dto(record).await
    }

    pub async fn get_event_public(&self, event_id: i64) -> Result<EventFullDto> {
        let record = sqlx::query_as::<_, EventRecord>(&format!(
            "{} WHERE e.id = $1 AND e.state = $2",
            EVENT_SELECT
        ))
        .bind(event_id)
        .bind(EventState::Published)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id={} was not found", event_id)))?;

        self.into_full_dto(record).await
    }

    pub async fn get_events_public(
        &self,
        filter: PublicEventFilter,
        page: Pagination,
    ) -> Result<Vec<EventShortDto>> {
        let (limit, offset) = page.limit_offset()?;

        let now = Local::now().naive_local();
        let range_start = filter.range_start.unwrap_or(now);
        let range_end = filter.range_end.unwrap_or(now + Duration::days(365 * 100));
        if range_start > range_end {
            return Err(AppError::validation("Start date must be before end date"));
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(EVENT_SELECT);
        qb.push(" WHERE e.state = ").push_bind(EventState::Published);

        if let Some(text) = filter.text.filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", text);
            qb.push(" AND (e.annotation ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(categories) = filter.categories.filter(|c| !c.is_empty()) {
            qb.push(" AND e.category_id = ANY(").push_bind(categories).push(")");
        }

        if let Some(paid) = filter.paid {
            qb.push(" AND e.paid = ").push_bind(paid);
        }

        qb.push(" AND e.event_date BETWEEN ")
            .push_bind(range_start)
            .push(" AND ")
            .push_bind(range_end);

        if filter.only_available {
            qb.push(" AND (e.participant_limit = 0 OR e.confirmed_requests < e.participant_limit)");
        }

        match filter.sort {
            EventSort::EventDate => qb.push(" ORDER BY e.event_date ASC"),
            // views live in the stats service; sorted after fetching below
            EventSort::Views | EventSort::Id => qb.push(" ORDER BY e.id ASC"),
        };
        qb.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

        let records = qb.build_query_as::<EventRecord>().fetch_all(&self.pool).await?;
        debug!("Public event search matched {} events", records.len());

        let mut dtos = self.into_short_dtos(records).await;
        if filter.sort == EventSort::Views {
            dtos.sort_by(|a, b| b.views.cmp(&a.views).then(a.id.cmp(&b.id)));
        }
        Ok(dtos)
    }

    pub async fn get_events_admin(
        &self,
        filter: AdminEventFilter,
        page: Pagination,
    ) -> Result<Vec<EventFullDto>> {
        let (limit, offset) = page.limit_offset()?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(EVENT_SELECT);
        qb.push(" WHERE TRUE");

        if let Some(users) = filter.users.filter(|u| !u.is_empty()) {
            qb.push(" AND e.initiator_id = ANY(").push_bind(users).push(")");
        }

        if let Some(states) = filter.states.filter(|s| !s.is_empty()) {
            let states: Vec<String> = states.iter().map(|s| s.as_str().to_string()).collect();
            qb.push(" AND e.state = ANY(").push_bind(states).push(")");
        }

        if let Some(categories) = filter.categories.filter(|c| !c.is_empty()) {
            qb.push(" AND e.category_id = ANY(").push_bind(categories).push(")");
        }

        if let Some(range_start) = filter.range_start {
            qb.push(" AND e.event_date >= ").push_bind(range_start);
        }
        if let Some(range_end) = filter.range_end {
            qb.push(" AND e.event_date <= ").push_bind(range_end);
        }

        qb.push(" ORDER BY e.id ASC LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

        let records = qb.build_query_as::<EventRecord>().fetch_all(&self.pool).await?;

        let views =
            event_views(self.stats.as_ref(), &keyed_published(&records)).await;
        let comments = self.comments_counts(&records.iter().map(|r| r.id).collect::<Vec<_>>()).await?;

        Ok(records
            .into_iter()
            .map(|r| {
                let v = views.get(&r.id).copied().unwrap_or(0);
                let c = comments.get(&r.id).copied().unwrap_or(0);
                r.into_full_dto(v, c)
            })
            .collect())
    }

    /// Applies the non-null patch fields to the event, resolving a changed
    /// category against the database. Blank strings are ignored, matching
    /// partial-update semantics.
    async fn apply_patch(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        event: &mut Event,
        patch: &UpdateEventRequest,
    ) -> Result<()> {
        if let Some(category_id) = patch.category {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                    .bind(category_id)
                    .fetch_one(&mut **tx)
                    .await?;
            if !exists {
                return Err(AppError::NotFound(format!(
                    "Category with id={} was not found",
                    category_id
                )));
            }
            event.category_id = category_id;
        }

        apply_field_patch(event, patch);
        Ok(())
    }

    async fn into_full_dto(&self, record: EventRecord) -> Result<EventFullDto> {
        let views = event_views(self.stats.as_ref(), &[(record.id, record.published_on)]).await;
        let comments = self.comments_counts(&[record.id]).await?;
        let id = record.id;
        Ok(record.into_full_dto(
            views.get(&id).copied().unwrap_or(0),
            comments.get(&id).copied().unwrap_or(0),
        ))
    }

    async fn into_short_dtos(&self, records: Vec<EventRecord>) -> Vec<EventShortDto> {
        let views = event_views(self.stats.as_ref(), &keyed_published(&records)).await;
        records
            .into_iter()
            .map(|r| {
                let v = views.get(&r.id).copied().unwrap_or(0);
                r.into_short_dto(v)
            })
            .collect()
    }

    async fn require_record(&self, event_id: i64) -> Result<EventRecord> {
        sqlx::query_as::<_, EventRecord>(&format!("{} WHERE e.id = $1", EVENT_SELECT))
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id={} was not found", event_id)))
    }

    /// APPROVED top-level comment counts per event id.
    async fn comments_counts(&self, event_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        if event_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT event_id, COUNT(*) FROM comments \
             WHERE event_id = ANY($1) AND status = 'APPROVED' AND parent_comment_id IS NULL \
             GROUP BY event_id",
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

fn keyed_published(records: &[EventRecord]) -> Vec<(i64, Option<NaiveDateTime>)> {
    records.iter().map(|r| (r.id, r.published_on)).collect()
}

async fn persist_event(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    event: &Event,
) -> Result<()> {
    sqlx::query(
        "UPDATE events SET annotation = $2, category_id = $3, description = $4, \
         event_date = $5, lat = $6, lon = $7, paid = $8, participant_limit = $9, \
         request_moderation = $10, state = $11, title = $12, published_on = $13 \
         WHERE id = $1",
    )
    .bind(event.id)
    .bind(&event.annotation)
    .bind(event.category_id)
    .bind(&event.description)
    .bind(event.event_date)
    .bind(event.lat)
    .bind(event.lon)
    .bind(event.paid)
    .bind(event.participant_limit)
    .bind(event.request_moderation)
    .bind(event.state)
    .bind(&event.title)
    .bind(event.published_on)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub const CREATE_MARGIN_HOURS: i64 = 2;
pub const PUBLISH_MARGIN_HOURS: i64 = 1;

/// The event date must be at least `hours` ahead of `now`.
fn ensure_event_date_margin(event_date: NaiveDateTime, now: NaiveDateTime, hours: i64) -> Result<()> {
    if event_date < now + Duration::hours(hours) {
        return Err(AppError::Validation(format!(
            "Event date must be at least {} hours from now",
            hours
        )));
    }
    Ok(())
}

fn apply_user_state_action(action: &str) -> Result<EventState> {
    match action.parse::<UserStateAction>() {
        Ok(UserStateAction::SendToReview) => Ok(EventState::Pending),
        Ok(UserStateAction::CancelReview) => Ok(EventState::Canceled),
        Err(_) => Err(AppError::Validation(format!("Invalid state action: {}", action))),
    }
}

/// Admin state transitions. Publishing stamps `published_on` and is valid
/// only from PENDING with the event date at least an hour out; rejecting is
/// valid unless the event is already PUBLISHED.
fn apply_admin_state_action(
    current: EventState,
    event_date: NaiveDateTime,
    action: &str,
    now: NaiveDateTime,
) -> Result<(EventState, Option<NaiveDateTime>)> {
    match action.parse::<AdminStateAction>() {
        Ok(AdminStateAction::PublishEvent) => {
            if current != EventState::Pending {
                return Err(AppError::conflict("Only pending events can be published"));
            }
            if event_date < now + Duration::hours(PUBLISH_MARGIN_HOURS) {
                return Err(AppError::conflict("Event date must be at least 1 hour from now"));
            }
            Ok((EventState::Published, Some(now)))
        }
        Ok(AdminStateAction::RejectEvent) => {
            if current == EventState::Published {
                return Err(AppError::conflict("Published events cannot be rejected"));
            }
            Ok((EventState::Canceled, None))
        }
        Err(_) => Err(AppError::Validation(format!("Invalid state action: {}", action))),
    }
}

/// In-memory part of the shared patch routine: plain field updates, blank
/// strings skipped.
fn apply_field_patch(event: &mut Event, patch: &UpdateEventRequest) {
    if let Some(annotation) = patch.annotation.as_ref().filter(|s| !s.trim().is_empty()) {
        event.annotation = annotation.clone();
    }
    if let Some(description) = patch.description.as_ref().filter(|s| !s.trim().is_empty()) {
        event.description = Some(description.clone());
    }
    if let Some(event_date) = patch.event_date {
        event.event_date = event_date;
    }
    if let Some(location) = patch.location {
        event.lat = location.lat;
        event.lon = location.lon;
    }
    if let Some(paid) = patch.paid {
        event.paid = paid;
    }
    if let Some(participant_limit) = patch.participant_limit {
        event.participant_limit = participant_limit;
    }
    if let Some(request_moderation) = patch.request_moderation {
        event.request_moderation = request_moderation;
    }
    if let Some(title) = patch.title.as_ref().filter(|s| !s.trim().is_empty()) {
        event.title = title.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 6, 1).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn sample_event() -> Event {
        Event {
            id: 1,
            annotation: "a".repeat(30),
            category_id: 1,
            confirmed_requests: 0,
            created_on: ts(0),
            description: Some("d".repeat(30)),
            event_date: ts(12),
            initiator_id: 1,
            lat: 55.75,
            lon: 37.62,
            paid: false,
            participant_limit: 0,
            published_on: None,
            request_moderation: true,
            state: EventState::Pending,
            title: "Concert".to_string(),
        }
    }

    #[test]
    fn creation_needs_two_hour_margin() {
        let now = ts(10);
        assert!(ensure_event_date_margin(ts(11), now, CREATE_MARGIN_HOURS).is_err());
        assert!(ensure_event_date_margin(ts(12), now, CREATE_MARGIN_HOURS).is_ok());
        assert!(ensure_event_date_margin(ts(13), now, CREATE_MARGIN_HOURS).is_ok());
    }

    #[test]
    fn publishing_requires_pending_state() {
        let now = ts(0);
        let ok = apply_admin_state_action(EventState::Pending, ts(12), "PUBLISH_EVENT", now).unwrap();
        assert_eq!(ok.0, EventState::Published);
        assert_eq!(ok.1, Some(now));

        let err = apply_admin_state_action(EventState::Published, ts(12), "PUBLISH_EVENT", now);
        assert!(matches!(err, Err(AppError::Conflict(_))));
        let err = apply_admin_state_action(EventState::Canceled, ts(12), "PUBLISH_EVENT", now);
        assert!(matches!(err, Err(AppError::Conflict(_))));
    }

    #[test]
    fn publishing_requires_one_hour_margin() {
        let now = ts(10);
        // starts now or within the hour
        let err = apply_admin_state_action(EventState::Pending, ts(10), "PUBLISH_EVENT", now);
        assert!(matches!(err, Err(AppError::Conflict(_))));
        let err =
            apply_admin_state_action(EventState::Pending, ts(10) + Duration::minutes(10), "PUBLISH_EVENT", now);
        assert!(matches!(err, Err(AppError::Conflict(_))));

        let ok = apply_admin_state_action(EventState::Pending, ts(11), "PUBLISH_EVENT", now).unwrap();
        assert_eq!(ok.0, EventState::Published);
    }

    #[test]
    fn rejecting_published_event_conflicts() {
        let now = ts(0);
        let err = apply_admin_state_action(EventState::Published, ts(12), "REJECT_EVENT", now);
        assert!(matches!(err, Err(AppError::Conflict(_))));

        let ok = apply_admin_state_action(EventState::Pending, ts(12), "REJECT_EVENT", now).unwrap();
        assert_eq!(ok.0, EventState::Canceled);
        assert_eq!(ok.1, None);
    }

    #[test]
    fn unknown_state_action_is_validation_error() {
        assert!(matches!(
            apply_admin_state_action(EventState::Pending, ts(12), "APPROVE", ts(0)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(apply_user_state_action("REVIEW"), Err(AppError::Validation(_))));
    }

    #[test]
    fn user_state_actions_move_between_pending_and_canceled() {
        assert_eq!(apply_user_state_action("SEND_TO_REVIEW").unwrap(), EventState::Pending);
        assert_eq!(apply_user_state_action("CANCEL_REVIEW").unwrap(), EventState::Canceled);
    }

    #[test]
    fn patch_applies_only_non_null_fields() {
        let mut event = sample_event();
        let patch = UpdateEventRequest {
            title: Some("New title".to_string()),
            paid: Some(true),
            participant_limit: Some(5),
            ..Default::default()
        };
        apply_field_patch(&mut event, &patch);
        assert_eq!(event.title, "New title");
        assert!(event.paid);
        assert_eq!(event.participant_limit, 5);
        // untouched fields keep their values
        assert_eq!(event.event_date, ts(12));
        assert!(event.request_moderation);
    }

    #[test]
    fn patch_ignores_blank_strings() {
        let mut event = sample_event();
        let before = event.annotation.clone();
        let patch = UpdateEventRequest {
            annotation: Some("   ".to_string()),
            ..Default::default()
        };
        apply_field_patch(&mut event, &patch);
        assert_eq!(event.annotation, before);
    }
}
