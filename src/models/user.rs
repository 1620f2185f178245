use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Abbreviated user representation embedded in event and comment DTOs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserShortDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUserRequest {
    #[validate(length(min = 2, max = 250, message = "must be between 2 and 250 characters"))]
    pub name: String,
    #[validate(email(message = "must be a well-formed email address"))]
    #[validate(length(min = 6, max = 254, message = "must be between 6 and 254 characters"))]
    pub email: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self { id: user.id, name: user.name, email: user.email }
    }
}

impl From<User> for UserShortDto {
    fn from(user: User) -> Self {
        Self { id: user.id, name: user.name }
    }
}
