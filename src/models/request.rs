use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::text_enum;
use crate::utils::serde_helpers::date_format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Confirmed,
    Rejected,
    Canceled,
}

text_enum!(RequestStatus {
    Pending => "PENDING",
    Confirmed => "CONFIRMED",
    Rejected => "REJECTED",
    Canceled => "CANCELED",
});

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipationRequest {
    pub id: i64,
    pub created: NaiveDateTime,
    pub event_id: i64,
    pub requester_id: i64,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipationRequestDto {
    pub id: i64,
    #[serde(with = "date_format")]
    pub created: NaiveDateTime,
    pub event: i64,
    pub requester: i64,
    pub status: RequestStatus,
}

impl From<ParticipationRequest> for ParticipationRequestDto {
    fn from(request: ParticipationRequest) -> Self {
        Self {
            id: request.id,
            created: request.created,
            event: request.event_id,
            requester: request.requester_id,
            status: request.status,
        }
    }
}

/// Initiator's bulk confirm/reject request. `status` is parsed by the
/// service so an unknown value maps to a validation error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequestStatusUpdateRequest {
    pub request_ids: Vec<i64>,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequestStatusUpdateResult {
    pub confirmed_requests: Vec<ParticipationRequestDto>,
    pub rejected_requests: Vec<ParticipationRequestDto>,
}
