use sqlx::PgPool;
use tracing::info;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::user::{NewUserRequest, User, UserDto};
use crate::models::Pagination;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, request: NewUserRequest) -> Result<UserDto> {
        request.validate()?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&request.email)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(AppError::Conflict(format!(
                "User with email '{}' already exists",
                request.email
            )));
        }

        // unique index still backs the check against concurrent inserts
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(&request.name)
        .bind(&request.email)
        .fetch_one(&self.pool)
        .await?;

        info!("Created user with id: {}", user.id);
        Ok(user.into())
    }

    pub async fn get_users(&self, ids: Option<Vec<i64>>, page: Pagination) -> Result<Vec<UserDto>> {
        let (limit, offset) = page.limit_offset()?;

        let users = match ids.filter(|ids| !ids.is_empty()) {
            Some(ids) => {
                sqlx::query_as::<_, User>(
                    "SELECT id, name, email FROM users WHERE id = ANY($1) \
                     ORDER BY id LIMIT $2 OFFSET $3",
                )
                .bind(ids)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(
                    "SELECT id, name, email FROM users ORDER BY id LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(users.into_iter().map(Into::into).collect())
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id={} was not found", user_id)));
        }

        info!("Deleted user with id: {}", user_id);
        Ok(())
    }
}
