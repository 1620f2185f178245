use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::text_enum;
use crate::models::user::UserShortDto;
use crate::utils::serde_helpers::{date_format, option_date_format};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
    Deleted,
}

text_enum!(CommentStatus {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
    Deleted => "DELETED",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeType {
    Like,
    Dislike,
}

text_enum!(LikeType {
    Like => "LIKE",
    Dislike => "DISLIKE",
});

/// Sort order for the public comment listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSort {
    Date,
    Rating,
}

impl CommentSort {
    /// Unknown sort strings fall back to newest-first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("RATING") => Self::Rating,
            _ => Self::Date,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub event_id: i64,
    pub parent_comment_id: Option<i64>,
    pub status: CommentStatus,
    pub likes_count: i32,
    pub dislikes_count: i32,
    pub rating: i32,
    pub pinned: bool,
    pub created: NaiveDateTime,
    pub updated: Option<NaiveDateTime>,
}

/// Comment row joined with its author name for DTO mapping.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub event_id: i64,
    pub parent_comment_id: Option<i64>,
    pub status: CommentStatus,
    pub likes_count: i32,
    pub dislikes_count: i32,
    pub rating: i32,
    pub pinned: bool,
    pub created: NaiveDateTime,
    pub updated: Option<NaiveDateTime>,
    pub author_name: String,
}

impl From<CommentRecord> for CommentDto {
    fn from(record: CommentRecord) -> Self {
        Self {
            id: record.id,
            text: record.text,
            author: UserShortDto { id: record.author_id, name: record.author_name },
            event_id: record.event_id,
            parent_comment_id: record.parent_comment_id,
            status: record.status,
            created: record.created,
            updated: record.updated,
            likes_count: record.likes_count,
            dislikes_count: record.dislikes_count,
            rating: record.rating,
            pinned: record.pinned,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentLike {
    pub id: i64,
    pub user_id: i64,
    pub comment_id: i64,
    #[sqlx(rename = "type")]
    pub like_type: LikeType,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub text: String,
    pub author: UserShortDto,
    pub event_id: i64,
    pub parent_comment_id: Option<i64>,
    pub status: CommentStatus,
    #[serde(with = "date_format")]
    pub created: NaiveDateTime,
    #[serde(with = "option_date_format")]
    pub updated: Option<NaiveDateTime>,
    pub likes_count: i32,
    pub dislikes_count: i32,
    pub rating: i32,
    pub pinned: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentDto {
    #[validate(length(min = 1, max = 2000, message = "must be between 1 and 2000 characters"))]
    pub text: String,
    pub parent_comment_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCommentDto {
    #[validate(length(min = 1, max = 2000, message = "must be between 1 and 2000 characters"))]
    pub text: String,
}

/// Admin moderation patch; `status` is parsed by the service so an unknown
/// value maps to a validation error.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentAdminUpdateDto {
    pub status: Option<String>,
    pub pinned: Option<bool>,
}
