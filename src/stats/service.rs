use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::stats::{EndpointHit, ViewStats};

#[derive(Clone)]
pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn save_hit(&self, hit: EndpointHit) -> Result<()> {
        hit.validate()?;

        sqlx::query("INSERT INTO hits (app, uri, ip, timestamp) VALUES ($1, $2, $3, $4)")
            .bind(&hit.app)
            .bind(&hit.uri)
            .bind(&hit.ip)
            .bind(hit.timestamp)
            .execute(&self.pool)
            .await?;

        debug!("Recorded hit on {} from {}", hit.uri, hit.ip);
        Ok(())
    }

    /// Hit counts per `(app, uri)` within the window, most hit first.
    /// `unique` counts distinct client addresses instead of raw hits.
    pub async fn get_stats(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        uris: Option<Vec<String>>,
        unique: bool,
    ) -> Result<Vec<ViewStats>> {
        if start > end {
            return Err(AppError::validation("Start date cannot be after end date"));
        }

        let count_expr = if unique { "COUNT(DISTINCT ip)" } else { "COUNT(ip)" };

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT app, uri, {} AS hits FROM hits WHERE timestamp BETWEEN ",
            count_expr
        ));
        qb.push_bind(start).push(" AND ").push_bind(end);

        if let Some(uris) = uris.filter(|u| !u.is_empty()) {
            qb.push(" AND uri = ANY(").push_bind(uris).push(")");
        }

        qb.push(" GROUP BY app, uri ORDER BY hits DESC");

        let stats = qb.build_query_as::<ViewStats>().fetch_all(&self.pool).await?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use chrono::NaiveDate;

    fn detached_service() -> StatsService {
        // lazy pool: connects only when a query actually runs
        StatsService::new(sqlx::PgPool::connect_lazy("postgres://localhost/unreachable").unwrap())
    }

    fn ts(month: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, month, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn rejects_inverted_window() {
        let service = detached_service();
        let err = service.get_stats(ts(6), ts(1), None, false).await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }
}
