use chrono::Local;
use sqlx::PgPool;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::event::{Event, EventState};
use crate::models::request::{
    EventRequestStatusUpdateRequest, EventRequestStatusUpdateResult, ParticipationRequest,
    ParticipationRequestDto, RequestStatus,
};

#[derive(Clone)]
pub struct RequestService {
    pool: PgPool,
}

impl RequestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_request(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> Result<ParticipationRequestDto> {
        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound(format!("User with id={} was not found", user_id)));
        }

        let mut tx = self.pool.begin().await?;

        // Lock the event row so the confirmed count and the limit check
        // cannot race with other requests.
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id={} was not found", event_id)))?;

        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM requests \
             WHERE requester_id = $1 AND event_id = $2 AND status <> 'CANCELED')",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;
        if duplicate {
            return Err(AppError::conflict("Request for this event already exists"));
        }

        if event.initiator_id == user_id {
            return Err(AppError::conflict(
                "Initiator cannot add request to participate in his event",
            ));
        }
        if event.state != EventState::Published {
            return Err(AppError::conflict("You cannot participate in an unpublished event"));
        }
        if event.participant_limit > 0 && event.confirmed_requests >= event.participant_limit {
            return Err(AppError::conflict("The participant limit has been reached"));
        }

        let status = if !event.request_moderation || event.participant_limit == 0 {
            RequestStatus::Confirmed
        } else {
            RequestStatus::Pending
        };

        let request = sqlx::query_as::<_, ParticipationRequest>(
            "INSERT INTO requests (created, event_id, requester_id, status) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Local::now().naive_local())
        .bind(event_id)
        .bind(user_id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        if status == RequestStatus::Confirmed {
            sqlx::query("UPDATE events SET confirmed_requests = confirmed_requests + 1 WHERE id = $1")
                .bind(event_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!("Created request with id: {} for event: {}", request.id, event_id);
        Ok(request.into())
    }

    pub async fn get_user_requests(&self, user_id: i64) -> Result<Vec<ParticipationRequestDto>> {
        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound(format!("User with id={} was not found", user_id)));
        }

        let requests = sqlx::query_as::<_, ParticipationRequest>(
            "SELECT * FROM requests WHERE requester_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests.into_iter().map(Into::into).collect())
    }

    pub async fn cancel_request(
        &self,
        user_id: i64,
        request_id: i64,
    ) -> Result<ParticipationRequestDto> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, ParticipationRequest>(
            "SELECT * FROM requests WHERE id = $1 AND requester_id = $2 FOR UPDATE",
        )
        .bind(request_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Request with id={} was not found", request_id))
        })?;

        // A confirmed request frees its slot when canceled.
        if request.status == RequestStatus::Confirmed {
            sqlx::query("UPDATE events SET confirmed_requests = confirmed_requests - 1 WHERE id = $1")
                .bind(request.event_id)
                .execute(&mut *tx)
                .await?;
        }

        let request = sqlx::query_as::<_, ParticipationRequest>(
            "UPDATE requests SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .bind(RequestStatus::Canceled)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Canceled request with id: {}", request_id);
        Ok(request.into())
    }

    /// Requests to an event, visible to its initiator only.
    pub async fn get_event_requests(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> Result<Vec<ParticipationRequestDto>> {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1 AND initiator_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        if !owned {
            return Err(AppError::NotFound(format!("Event with id={} was not found", event_id)));
        }

        let requests = sqlx::query_as::<_, ParticipationRequest>(
            "SELECT * FROM requests WHERE event_id = $1 ORDER BY id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests.into_iter().map(Into::into).collect())
    }

    pub async fn update_request_statuses(
        &self,
        user_id: i64,
        event_id: i64,
        update: EventRequestStatusUpdateRequest,
    ) -> Result<EventRequestStatusUpdateResult> {
        let target: RequestStatus = update
            .status
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid request status: {}", update.status)))?;
        if target != RequestStatus::Confirmed && target != RequestStatus::Rejected {
            return Err(AppError::Validation(format!(
                "Invalid request status: {}",
                update.status
            )));
        }

        // nothing to moderate
        if update.request_ids.is_empty() {
            return Ok(EventRequestStatusUpdateResult::default());
        }

        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE id = $1 AND initiator_id = $2 FOR UPDATE",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id={} was not found", event_id)))?;

        // Events without moderation confirm every request on creation, so
        // there is nothing to moderate.
        if event.participant_limit == 0 || !event.request_moderation {
            return Ok(EventRequestStatusUpdateResult::default());
        }

        let requests = sqlx::query_as::<_, ParticipationRequest>(
            "SELECT * FROM requests WHERE id = ANY($1) AND event_id = $2 ORDER BY id FOR UPDATE",
        )
        .bind(&update.request_ids)
        .bind(event_id)
        .fetch_all(&mut *tx)
        .await?;

        if requests.len() != update.request_ids.len() {
            return Err(AppError::NotFound(format!(
                "Some requests were not found for event with id={}",
                event_id
            )));
        }
        if requests.iter().any(|r| r.status != RequestStatus::Pending) {
            return Err(AppError::conflict("All requests must be pending"));
        }

        let mut result = EventRequestStatusUpdateResult::default();

        if target == RequestStatus::Rejected {
            for request in requests {
                let rejected = set_status(&mut tx, request.id, RequestStatus::Rejected).await?;
                result.rejected_requests.push(rejected.into());
            }
            tx.commit().await?;
            return Ok(result);
        }

        let capacity_left = (event.participant_limit - event.confirmed_requests).max(0) as usize;
        if capacity_left == 0 {
            return Err(AppError::conflict("The participant limit has been reached"));
        }

        let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
        let (to_confirm, leftover) = split_by_capacity(&ids, capacity_left);

        for &id in to_confirm {
            let confirmed = set_status(&mut tx, id, RequestStatus::Confirmed).await?;
            result.confirmed_requests.push(confirmed.into());
        }
        sqlx::query("UPDATE events SET confirmed_requests = confirmed_requests + $2 WHERE id = $1")
            .bind(event_id)
            .bind(to_confirm.len() as i32)
            .execute(&mut *tx)
            .await?;

        // Confirmations made before the limit ran out are kept; the caller
        // learns about the overflow through the conflict status.
        tx.commit().await?;

        if !leftover.is_empty() {
            return Err(AppError::conflict("The participant limit has been reached"));
        }

        info!(
            "Confirmed {} requests for event: {}",
            result.confirmed_requests.len(),
            event_id
        );
        Ok(result)
    }
}

async fn set_status(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    request_id: i64,
    status: RequestStatus,
) -> Result<ParticipationRequest> {
    let request = sqlx::query_as::<_, ParticipationRequest>(
        "UPDATE requests SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(request_id)
    .bind(status)
    .fetch_one(&mut **tx)
    .await?;
    Ok(request)
}

/// First `capacity` ids get confirmed, the rest overflow.
fn split_by_capacity(ids: &[i64], capacity: usize) -> (&[i64], &[i64]) {
    let cut = capacity.min(ids.len());
    ids.split_at(cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_split_confirms_in_order() {
        let ids = [10, 11, 12, 13];
        let (confirmed, leftover) = split_by_capacity(&ids, 2);
        assert_eq!(confirmed, &[10, 11]);
        assert_eq!(leftover, &[12, 13]);
    }

    #[test]
    fn capacity_split_handles_enough_room() {
        let ids = [7, 8];
        let (confirmed, leftover) = split_by_capacity(&ids, 10);
        assert_eq!(confirmed, &[7, 8]);
        assert!(leftover.is_empty());
    }

    #[test]
    fn capacity_split_handles_empty_input() {
        let (confirmed, leftover) = split_by_capacity(&[], 3);
        assert!(confirmed.is_empty());
        assert!(leftover.is_empty());
    }

    fn detached_service() -> RequestService {
        // lazy pool: connects only when a query actually runs
        RequestService::new(PgPool::connect_lazy("postgres://localhost/unreachable").unwrap())
    }

    #[tokio::test]
    async fn empty_bulk_update_returns_empty_result() {
        let service = detached_service();
        let update = EventRequestStatusUpdateRequest {
            request_ids: vec![],
            status: "CONFIRMED".to_string(),
        };
        let result = service.update_request_statuses(1, 1, update).await.unwrap();
        assert!(result.confirmed_requests.is_empty());
        assert!(result.rejected_requests.is_empty());
    }

    #[tokio::test]
    async fn unknown_bulk_status_is_validation_error() {
        let service = detached_service();
        let update = EventRequestStatusUpdateRequest {
            request_ids: vec![1],
            status: "APPROVED".to_string(),
        };
        let err = service.update_request_statuses(1, 1, update).await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }
}
