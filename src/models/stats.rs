use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::serde_helpers::date_format;

/// One recorded page view, the wire shape of `POST /hit`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EndpointHit {
    #[validate(length(min = 1, max = 255, message = "must not be blank"))]
    pub app: String,
    #[validate(length(min = 1, max = 512, message = "must not be blank"))]
    pub uri: String,
    #[validate(length(min = 1, max = 45, message = "must not be blank"))]
    pub ip: String,
    #[serde(with = "date_format")]
    pub timestamp: NaiveDateTime,
}

/// Aggregated view count for one (app, uri) pair.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ViewStats {
    pub app: String,
    pub uri: String,
    pub hits: i64,
}
