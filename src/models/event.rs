use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::text_enum;
use crate::models::category::CategoryDto;
use crate::models::user::UserShortDto;
use crate::utils::serde_helpers::{date_format, option_date_format};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    Pending,
    Published,
    Canceled,
}

text_enum!(EventState {
    Pending => "PENDING",
    Published => "PUBLISHED",
    Canceled => "CANCELED",
});

/// State action a user may request on their own event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStateAction {
    SendToReview,
    CancelReview,
}

text_enum!(UserStateAction {
    SendToReview => "SEND_TO_REVIEW",
    CancelReview => "CANCEL_REVIEW",
});

/// State action an admin may request while moderating an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminStateAction {
    PublishEvent,
    RejectEvent,
}

text_enum!(AdminStateAction {
    PublishEvent => "PUBLISH_EVENT",
    RejectEvent => "REJECT_EVENT",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    pub lat: f32,
    pub lon: f32,
}

/// Persisted event row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub annotation: String,
    pub category_id: i64,
    pub confirmed_requests: i32,
    pub created_on: NaiveDateTime,
    pub description: Option<String>,
    pub event_date: NaiveDateTime,
    pub initiator_id: i64,
    pub lat: f32,
    pub lon: f32,
    pub paid: bool,
    pub participant_limit: i32,
    pub published_on: Option<NaiveDateTime>,
    pub request_moderation: bool,
    pub state: EventState,
    pub title: String,
}

/// Event row joined with its category and initiator names, the shape every
/// read query produces for DTO mapping.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub annotation: String,
    pub category_id: i64,
    pub confirmed_requests: i32,
    pub created_on: NaiveDateTime,
    pub description: Option<String>,
    pub event_date: NaiveDateTime,
    pub initiator_id: i64,
    pub lat: f32,
    pub lon: f32,
    pub paid: bool,
    pub participant_limit: i32,
    pub published_on: Option<NaiveDateTime>,
    pub request_moderation: bool,
    pub state: EventState,
    pub title: String,
    pub category_name: String,
    pub initiator_name: String,
}

impl EventRecord {
    pub fn into_full_dto(self, views: i64, comments_count: i64) -> EventFullDto {
        EventFullDto {
            id: self.id,
            title: self.title,
            annotation: self.annotation,
            description: self.description,
            category: CategoryDto { id: self.category_id, name: self.category_name },
            paid: self.paid,
            event_date: self.event_date,
            initiator: UserShortDto { id: self.initiator_id, name: self.initiator_name },
            location: Location { lat: self.lat, lon: self.lon },
            views,
            confirmed_requests: self.confirmed_requests,
            participant_limit: self.participant_limit,
            state: self.state,
            created_on: self.created_on,
            published_on: self.published_on,
            request_moderation: self.request_moderation,
            comments_count,
        }
    }

    pub fn into_short_dto(self, views: i64) -> EventShortDto {
        EventShortDto {
            id: self.id,
            title: self.title,
            annotation: self.annotation,
            category: CategoryDto { id: self.category_id, name: self.category_name },
            paid: self.paid,
            event_date: self.event_date,
            initiator: UserShortDto { id: self.initiator_id, name: self.initiator_name },
            views,
            confirmed_requests: self.confirmed_requests,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFullDto {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: Option<String>,
    pub category: CategoryDto,
    pub paid: bool,
    #[serde(with = "date_format")]
    pub event_date: NaiveDateTime,
    pub initiator: UserShortDto,
    pub location: Location,
    pub views: i64,
    pub confirmed_requests: i32,
    pub participant_limit: i32,
    pub state: EventState,
    #[serde(with = "date_format")]
    pub created_on: NaiveDateTime,
    #[serde(with = "option_date_format")]
    pub published_on: Option<NaiveDateTime>,
    pub request_moderation: bool,
    pub comments_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventShortDto {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub category: CategoryDto,
    pub paid: bool,
    #[serde(with = "date_format")]
    pub event_date: NaiveDateTime,
    pub initiator: UserShortDto,
    pub views: i64,
    pub confirmed_requests: i32,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEventDto {
    #[validate(length(min = 20, max = 2000, message = "must be between 20 and 2000 characters"))]
    pub annotation: String,
    pub category: i64,
    #[validate(length(min = 20, max = 7000, message = "must be between 20 and 7000 characters"))]
    pub description: String,
    #[serde(with = "date_format")]
    pub event_date: NaiveDateTime,
    pub location: Location,
    #[serde(default)]
    pub paid: bool,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[serde(default)]
    pub participant_limit: i32,
    #[serde(default = "default_true")]
    pub request_moderation: bool,
    #[validate(length(min = 3, max = 120, message = "must be between 3 and 120 characters"))]
    pub title: String,
}

/// Partial update shared by the user and admin PATCH endpoints. `state_action`
/// strings differ per audience and are interpreted by the service.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(length(min = 20, max = 2000, message = "must be between 20 and 2000 characters"))]
    pub annotation: Option<String>,
    pub category: Option<i64>,
    #[validate(length(min = 20, max = 7000, message = "must be between 20 and 7000 characters"))]
    pub description: Option<String>,
    #[serde(default, with = "option_date_format")]
    pub event_date: Option<NaiveDateTime>,
    pub location: Option<Location>,
    pub paid: Option<bool>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    pub state_action: Option<String>,
    #[validate(length(min = 3, max = 120, message = "must be between 3 and 120 characters"))]
    pub title: Option<String>,
}

/// Resolved sort order for the public event search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventSort {
    EventDate,
    Views,
    #[default]
    Id,
}

impl EventSort {
    /// Unknown sort strings fall back to id order, matching the default.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("EVENT_DATE") => Self::EventDate,
            Some("VIEWS") => Self::Views,
            _ => Self::Id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_state_round_trips_as_text() {
        assert_eq!(EventState::Published.as_str(), "PUBLISHED");
        assert_eq!("CANCELED".parse::<EventState>().unwrap(), EventState::Canceled);
        assert!("published".parse::<EventState>().is_err());
    }

    #[test]
    fn state_actions_parse_from_wire_strings() {
        assert_eq!(
            "SEND_TO_REVIEW".parse::<UserStateAction>().unwrap(),
            UserStateAction::SendToReview
        );
        assert_eq!(
            "PUBLISH_EVENT".parse::<AdminStateAction>().unwrap(),
            AdminStateAction::PublishEvent
        );
        assert!("PUBLISH".parse::<AdminStateAction>().is_err());
    }

    #[test]
    fn sort_falls_back_to_id_order() {
        assert_eq!(EventSort::parse(Some("EVENT_DATE")), EventSort::EventDate);
        assert_eq!(EventSort::parse(Some("VIEWS")), EventSort::Views);
        assert_eq!(EventSort::parse(Some("banana")), EventSort::Id);
        assert_eq!(EventSort::parse(None), EventSort::Id);
    }

    #[test]
    fn new_event_defaults_match_creation_rules() {
        let json = r#"{
            "annotation": "a long enough annotation text here",
            "category": 1,
            "description": "a long enough description text for the event",
            "eventDate": "2030-01-01 12:00:00",
            "location": {"lat": 55.75, "lon": 37.62},
            "title": "Concert"
        }"#;
        let dto: NewEventDto = serde_json::from_str(json).unwrap();
        assert!(!dto.paid);
        assert_eq!(dto.participant_limit, 0);
        assert!(dto.request_moderation);
    }
}
