use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::event::EventShortDto;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Compilation {
    pub id: i64,
    pub pinned: bool,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompilationDto {
    pub id: i64,
    pub events: Vec<EventShortDto>,
    pub pinned: bool,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCompilationDto {
    pub events: Option<Vec<i64>>,
    pub pinned: Option<bool>,
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCompilationRequest {
    pub events: Option<Vec<i64>>,
    pub pinned: Option<bool>,
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub title: Option<String>,
}
