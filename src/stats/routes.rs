use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::stats::{EndpointHit, ViewStats};
use crate::stats::StatsState;
use crate::utils::{parse_date_param, parse_string_list};

pub fn router() -> Router<Arc<StatsState>> {
    Router::new()
        .route("/hit", post(save_hit))
        .route("/stats", get(get_stats))
}

#[derive(Debug, Deserialize)]
struct StatsParams {
    start: Option<String>,
    end: Option<String>,
    uris: Option<String>,
    #[serde(default)]
    unique: bool,
}

/// POST /hit
async fn save_hit(
    State(state): State<Arc<StatsState>>,
    Json(hit): Json<EndpointHit>,
) -> Result<StatusCode> {
    state.service.save_hit(hit).await?;
    Ok(StatusCode::CREATED)
}

/// GET /stats
async fn get_stats(
    State(state): State<Arc<StatsState>>,
    Query(params): Query<StatsParams>,
) -> Result<Json<Vec<ViewStats>>> {
    let start = params
        .start
        .as_deref()
        .ok_or_else(|| AppError::validation("Parameter 'start' is required"))
        .and_then(|v| parse_date_param("start", v))?;
    let end = params
        .end
        .as_deref()
        .ok_or_else(|| AppError::validation("Parameter 'end' is required"))
        .and_then(|v| parse_date_param("end", v))?;
    let uris = params.uris.as_deref().map(parse_string_list);

    let stats = state.service.get_stats(start, end, uris, params.unique).await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> axum::Router {
        // lazy pool: connects only when a query actually runs
        let pool = sqlx::PgPool::connect_lazy("postgres://localhost/unreachable").unwrap();
        router().with_state(Arc::new(StatsState::new(pool)))
    }

    async fn get(uri: &str) -> StatusCode {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn stats_requires_start_parameter() {
        let status = get("/stats?end=2025-06-01%2000:00:00").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stats_requires_end_parameter() {
        let status = get("/stats?start=2025-01-01%2000:00:00").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stats_rejects_malformed_date() {
        let status = get("/stats?start=2025-01-01T00:00:00&end=2025-06-01%2000:00:00").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stats_rejects_inverted_window() {
        let status = get("/stats?start=2025-06-01%2000:00:00&end=2025-01-01%2000:00:00").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
