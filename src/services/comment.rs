use chrono::{Duration, Local, NaiveDateTime};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::comment::{
    Comment, CommentAdminUpdateDto, CommentDto, CommentLike, CommentRecord, CommentSort,
    CommentStatus, LikeType, NewCommentDto, UpdateCommentDto,
};
use crate::models::event::EventState;
use crate::models::Pagination;

const DELETED_TEXT: &str = "[deleted]";
const DELETED_REPLY_TEXT: &str = "[deleted - parent comment was deleted]";
const EDIT_WINDOW_HOURS: i64 = 24;

const COMMENT_SELECT: &str = "SELECT c.id, c.text, c.author_id, c.event_id, c.parent_comment_id, \
     c.status, c.likes_count, c.dislikes_count, c.rating, c.pinned, c.created, c.updated, \
     u.name AS author_name \
     FROM comments c JOIN users u ON u.id = c.author_id";

#[derive(Clone)]
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_comment(
        &self,
        user_id: i64,
        event_id: i64,
        request: NewCommentDto,
    ) -> Result<CommentDto> {
        request.validate()?;

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound(format!("User with id={} was not found", user_id)));
        }

        let state: Option<EventState> =
            sqlx::query_scalar("SELECT state FROM events WHERE id = $1")
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await?;
        match state {
            None => {
                return Err(AppError::NotFound(format!(
                    "Event with id={} was not found",
                    event_id
                )))
            }
            Some(state) if state != EventState::Published => {
                return Err(AppError::conflict("Cannot comment on unpublished event"))
            }
            Some(_) => {}
        }

        if let Some(parent_id) = request.parent_comment_id {
            let parent = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
                .bind(parent_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Comment with id={} was not found", parent_id))
                })?;
            if parent.event_id != event_id {
                return Err(AppError::conflict("Parent comment belongs to different event"));
            }
            if parent.status == CommentStatus::Deleted {
                return Err(AppError::conflict("Cannot reply to deleted comment"));
            }
        }

        let comment_id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (text, author_id, event_id, parent_comment_id, status, \
             likes_count, dislikes_count, rating, pinned, created) \
             VALUES ($1, $2, $3, $4, $5, 0, 0, 0, FALSE, $6) RETURNING id",
        )
        .bind(&request.text)
        .bind(user_id)
        .bind(event_id)
        .bind(request.parent_comment_id)
        .bind(CommentStatus::Pending)
        .bind(Local::now().naive_local())
        .fetch_one(&self.pool)
        .await?;

        info!("Created comment with id: {} on event: {}", comment_id, event_id);
        self.require_record(comment_id).await
    }

    pub async fn update_comment(
        &self,
        user_id: i64,
        comment_id: i64,
        request: UpdateCommentDto,
    ) -> Result<CommentDto> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let comment = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE id = $1 AND author_id = $2 FOR UPDATE",
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Comment with id={} was not found", comment_id))
        })?;

        let now = Local::now().naive_local();
        ensure_editable(&comment, now)?;

        // An edited comment goes back through moderation.
        sqlx::query("UPDATE comments SET text = $2, status = $3, updated = $4 WHERE id = $1")
            .bind(comment_id)
            .bind(&request.text)
            .bind(CommentStatus::Pending)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.require_record(comment_id).await
    }

    pub async fn delete_comment(&self, user_id: i64, comment_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1 AND author_id = $2)",
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if !found {
            return Err(AppError::NotFound(format!(
                "Comment with id={} was not found",
                comment_id
            )));
        }

        soft_delete(&mut tx, comment_id).await?;
        tx.commit().await?;
        info!("Deleted comment with id: {}", comment_id);
        Ok(())
    }

    pub async fn delete_comment_by_admin(&self, comment_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)")
            .bind(comment_id)
            .fetch_one(&mut *tx)
            .await?;
        if !found {
            return Err(AppError::NotFound(format!(
                "Comment with id={} was not found",
                comment_id
            )));
        }

        soft_delete(&mut tx, comment_id).await?;
        tx.commit().await?;
        info!("Admin deleted comment with id: {}", comment_id);
        Ok(())
    }

    pub async fn get_user_comments(
        &self,
        user_id: i64,
        page: Pagination,
    ) -> Result<Vec<CommentDto>> {
        let (limit, offset) = page.limit_offset()?;

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound(format!("User with id={} was not found", user_id)));
        }

        let records = sqlx::query_as::<_, CommentRecord>(&format!(
            "{} WHERE c.author_id = $1 ORDER BY c.created DESC LIMIT $2 OFFSET $3",
            COMMENT_SELECT
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    pub async fn get_event_comments(
        &self,
        event_id: i64,
        sort: CommentSort,
        page: Pagination,
    ) -> Result<Vec<CommentDto>> {
        let (limit, offset) = page.limit_offset()?;

        let event_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;
        if !event_exists {
            return Err(AppError::NotFound(format!("Event with id={} was not found", event_id)));
        }

        let order = match sort {
            CommentSort::Date => "c.created DESC",
            CommentSort::Rating => "c.pinned DESC, c.rating DESC, c.created DESC",
        };

        let records = sqlx::query_as::<_, CommentRecord>(&format!(
            "{} WHERE c.event_id = $1 AND c.status = $2 AND c.parent_comment_id IS NULL \
             ORDER BY {} LIMIT $3 OFFSET $4",
            COMMENT_SELECT, order
        ))
        .bind(event_id)
        .bind(CommentStatus::Approved)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    pub async fn get_comments_admin(
        &self,
        status: Option<CommentStatus>,
        page: Pagination,
    ) -> Result<Vec<CommentDto>> {
        let (limit, offset) = page.limit_offset()?;

        let records = match status {
            Some(status) => {
                sqlx::query_as::<_, CommentRecord>(&format!(
                    "{} WHERE c.status = $1 ORDER BY c.created DESC LIMIT $2 OFFSET $3",
                    COMMENT_SELECT
                ))
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, CommentRecord>(&format!(
                    "{} ORDER BY c.created DESC LIMIT $1 OFFSET $2",
                    COMMENT_SELECT
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(records.into_iter().map(Into::into).collect())
    }

    pub async fn moderate_comment(
        &self,
        comment_id: i64,
        request: CommentAdminUpdateDto,
    ) -> Result<CommentDto> {
        let status = match request.status.as_deref() {
            Some(raw) => Some(raw.parse::<CommentStatus>().map_err(|_| {
                AppError::Validation(format!("Invalid comment status: {}", raw))
            })?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let mut comment =
            sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1 FOR UPDATE")
                .bind(comment_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Comment with id={} was not found", comment_id))
                })?;

        if let Some(status) = status {
            comment.status = status;
        }
        if let Some(pinned) = request.pinned {
            comment.pinned = pinned;
        }

        sqlx::query("UPDATE comments SET status = $2, pinned = $3, updated = $4 WHERE id = $1")
            .bind(comment_id)
            .bind(comment.status)
            .bind(comment.pinned)
            .bind(Local::now().naive_local())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Moderated comment with id: {}", comment_id);
        self.require_record(comment_id).await
    }

    pub async fn add_reaction(
        &self,
        user_id: i64,
        comment_id: i64,
        reaction: LikeType,
    ) -> Result<CommentDto> {
        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound(format!("User with id={} was not found", user_id)));
        }

        let mut tx = self.pool.begin().await?;

        let mut comment =
            sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1 FOR UPDATE")
                .bind(comment_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Comment with id={} was not found", comment_id))
                })?;

        if comment.status != CommentStatus::Approved {
            return Err(AppError::conflict("Cannot like unapproved comment"));
        }

        let existing = sqlx::query_as::<_, CommentLike>(
            "SELECT * FROM comment_likes WHERE user_id = $1 AND comment_id = $2",
        )
        .bind(user_id)
        .bind(comment_id)
        .fetch_optional(&mut *tx)
        .await?;

        match existing {
            Some(like) if like.like_type == reaction => {
                // repeated reaction, nothing changes
            }
            Some(like) => {
                sqlx::query("UPDATE comment_likes SET type = $2 WHERE id = $1")
                    .bind(like.id)
                    .bind(reaction)
                    .execute(&mut *tx)
                    .await?;
                apply_reaction_change(&mut comment, Some(like.like_type), Some(reaction));
                persist_counters(&mut tx, &comment).await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO comment_likes (user_id, comment_id, type, created) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(user_id)
                .bind(comment_id)
                .bind(reaction)
                .bind(Local::now().naive_local())
                .execute(&mut *tx)
                .await?;
                apply_reaction_change(&mut comment, None, Some(reaction));
                persist_counters(&mut tx, &comment).await?;
            }
        }

        tx.commit().await?;
        self.require_record(comment_id).await
    }

    pub async fn remove_reaction(&self, user_id: i64, comment_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let mut comment =
            sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1 FOR UPDATE")
                .bind(comment_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Comment with id={} was not found", comment_id))
                })?;

        let like = sqlx::query_as::<_, CommentLike>(
            "SELECT * FROM comment_likes WHERE user_id = $1 AND comment_id = $2",
        )
        .bind(user_id)
        .bind(comment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Reaction on comment with id={} was not found",
                comment_id
            ))
        })?;

        sqlx::query("DELETE FROM comment_likes WHERE id = $1")
            .bind(like.id)
            .execute(&mut *tx)
            .await?;
        apply_reaction_change(&mut comment, Some(like.like_type), None);
        persist_counters(&mut tx, &comment).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn require_record(&self, comment_id: i64) -> Result<CommentDto> {
        let record = sqlx::query_as::<_, CommentRecord>(&format!(
            "{} WHERE c.id = $1",
            COMMENT_SELECT
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Comment with id={} was not found", comment_id))
        })?;
        Ok(record.into())
    }
}

fn ensure_editable(comment: &Comment, now: NaiveDateTime) -> Result<()> {
    if comment.status == CommentStatus::Deleted {
        return Err(AppError::conflict("Cannot update deleted comment"));
    }
    if now > comment.created + Duration::hours(EDIT_WINDOW_HOURS) {
        return Err(AppError::conflict(
            "Comment can only be edited within 24 hours of creation",
        ));
    }
    Ok(())
}

/// Moves the like and dislike counters for a reaction transition and
/// recomputes the rating. `None` stands for no recorded reaction.
fn apply_reaction_change(comment: &mut Comment, from: Option<LikeType>, to: Option<LikeType>) {
    match from {
        Some(LikeType::Like) => comment.likes_count -= 1,
        Some(LikeType::Dislike) => comment.dislikes_count -= 1,
        None => {}
    }
    match to {
        Some(LikeType::Like) => comment.likes_count += 1,
        Some(LikeType::Dislike) => comment.dislikes_count += 1,
        None => {}
    }
    comment.rating = comment.likes_count - comment.dislikes_count;
}

async fn persist_counters(
    tx: &mut Transaction<'_, Postgres>,
    comment: &Comment,
) -> Result<()> {
    sqlx::query(
        "UPDATE comments SET likes_count = $2, dislikes_count = $3, rating = $4 WHERE id = $1",
    )
    .bind(comment.id)
    .bind(comment.likes_count)
    .bind(comment.dislikes_count)
    .bind(comment.rating)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn soft_delete(tx: &mut Transaction<'_, Postgres>, comment_id: i64) -> Result<()> {
    sqlx::query("UPDATE comments SET text = $2, status = $3 WHERE id = $1")
        .bind(comment_id)
        .bind(DELETED_TEXT)
        .bind(CommentStatus::Deleted)
        .execute(&mut **tx)
        .await?;

    sqlx::query("UPDATE comments SET text = $2, status = $3 WHERE parent_comment_id = $1")
        .bind(comment_id)
        .bind(DELETED_REPLY_TEXT)
        .bind(CommentStatus::Deleted)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 6, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn sample_comment(status: CommentStatus) -> Comment {
        Comment {
            id: 1,
            text: "great show".to_string(),
            author_id: 1,
            event_id: 1,
            parent_comment_id: None,
            status,
            likes_count: 0,
            dislikes_count: 0,
            rating: 0,
            pinned: false,
            created: ts(1, 10),
            updated: None,
        }
    }

    #[test]
    fn edit_window_closes_after_24_hours() {
        let comment = sample_comment(CommentStatus::Approved);
        assert!(ensure_editable(&comment, ts(1, 12)).is_ok());
        assert!(ensure_editable(&comment, ts(2, 10)).is_ok());
        assert!(ensure_editable(&comment, ts(2, 11)).is_err());
    }

    #[test]
    fn deleted_comment_is_not_editable() {
        let comment = sample_comment(CommentStatus::Deleted);
        assert!(matches!(ensure_editable(&comment, ts(1, 11)), Err(AppError::Conflict(_))));
    }

    #[test]
    fn opposite_reaction_moves_both_counters() {
        let mut comment = sample_comment(CommentStatus::Approved);
        apply_reaction_change(&mut comment, None, Some(LikeType::Like));
        assert_eq!((comment.likes_count, comment.dislikes_count, comment.rating), (1, 0, 1));

        apply_reaction_change(&mut comment, Some(LikeType::Like), Some(LikeType::Dislike));
        assert_eq!((comment.likes_count, comment.dislikes_count, comment.rating), (0, 1, -1));

        apply_reaction_change(&mut comment, Some(LikeType::Dislike), None);
        assert_eq!((comment.likes_count, comment.dislikes_count, comment.rating), (0, 0, 0));
    }

    proptest! {
        #[test]
        fn rating_always_equals_likes_minus_dislikes(
            transitions in prop::collection::vec((0u8..3, 0u8..3), 0..50)
        ) {
            let decode = |v: u8| match v {
                0 => None,
                1 => Some(LikeType::Like),
                _ => Some(LikeType::Dislike),
            };
            let mut comment = sample_comment(CommentStatus::Approved);
            for (from, to) in transitions {
                apply_reaction_change(&mut comment, decode(from), decode(to));
            }
            prop_assert_eq!(comment.rating, comment.likes_count - comment.dislikes_count);
        }
    }
}
