use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::compilation::{
    Compilation, CompilationDto, NewCompilationDto, UpdateCompilationRequest,
};
use crate::models::event::{EventRecord, EventShortDto};
use crate::models::Pagination;
use crate::services::event::EVENT_SELECT;
use crate::services::stats_client::{event_views, ViewTracker};

#[derive(Clone)]
pub struct CompilationService {
    pool: PgPool,
    stats: Arc<dyn ViewTracker>,
}

impl CompilationService {
    pub fn new(pool: PgPool, stats: Arc<dyn ViewTracker>) -> Self {
        Self { pool, stats }
    }

    pub async fn create_compilation(&self, request: NewCompilationDto) -> Result<CompilationDto> {
        request.validate()?;

        let event_ids = request.events.unwrap_or_default();
        self.ensure_events_exist(&event_ids).await?;

        let mut tx = self.pool.begin().await?;

        let compilation = sqlx::query_as::<_, Compilation>(
            "INSERT INTO compilations (pinned, title) VALUES ($1, $2) RETURNING *",
        )
        .bind(request.pinned.unwrap_or(false))
        .bind(&request.title)
        .fetch_one(&mut *tx)
        .await?;

        for event_id in &event_ids {
            sqlx::query(
                "INSERT INTO compilation_events (compilation_id, event_id) VALUES ($1, $2)",
            )
            .bind(compilation.id)
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Created compilation with id: {}", compilation.id);
        self.into_dto(compilation).await
    }

    pub async fn update_compilation(
        &self,
        comp_id: i64,
        request: UpdateCompilationRequest,
    ) -> Result<CompilationDto> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let mut compilation = sqlx::query_as::<_, Compilation>(
            "SELECT * FROM compilations WHERE id = $1 FOR UPDATE",
        )
        .bind(comp_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Compilation with id={} was not found", comp_id))
        })?;

        if let Some(title) = request.title.filter(|t| !t.trim().is_empty()) {
            compilation.title = title;
        }
        if let Some(pinned) = request.pinned {
            compilation.pinned = pinned;
        }

        sqlx::query("UPDATE compilations SET pinned = $2, title = $3 WHERE id = $1")
            .bind(comp_id)
            .bind(compilation.pinned)
            .bind(&compilation.title)
            .execute(&mut *tx)
            .await?;

        if let Some(event_ids) = request.events {
            self.ensure_events_exist(&event_ids).await?;
            sqlx::query("DELETE FROM compilation_events WHERE compilation_id = $1")
                .bind(comp_id)
                .execute(&mut *tx)
                .await?;
            for event_id in &event_ids {
                sqlx::query(
                    "INSERT INTO compilation_events (compilation_id, event_id) VALUES ($1, $2)",
                )
                .bind(comp_id)
                .bind(event_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        info!("Updated compilation with id: {}", comp_id);
        self.into_dto(compilation).await
    }

    pub async fn delete_compilation(&self, comp_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM compilations WHERE id = $1")
            .bind(comp_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Compilation with id={} was not found",
                comp_id
            )));
        }
        info!("Deleted compilation with id: {}", comp_id);
        Ok(())
    }

    pub async fn get_compilations(
        &self,
        pinned: Option<bool>,
        page: Pagination,
    ) -> Result<Vec<CompilationDto>> {
        let (limit, offset) = page.limit_offset()?;

        let compilations = match pinned {
            Some(pinned) => {
                sqlx::query_as::<_, Compilation>(
                    "SELECT * FROM compilations WHERE pinned = $1 ORDER BY id LIMIT $2 OFFSET $3",
                )
                .bind(pinned)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Compilation>(
                    "SELECT * FROM compilations ORDER BY id LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut dtos = Vec::with_capacity(compilations.len());
        for compilation in compilations {
            dtos.push(self.into_dto(compilation).await?);
        }
        Ok(dtos)
    }

    pub async fn get_compilation(&self, comp_id: i64) -> Result<CompilationDto> {
        let compilation =
            sqlx::query_as::<_, Compilation>("SELECT * FROM compilations WHERE id = $1")
                .bind(comp_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Compilation with id={} was not found", comp_id))
                })?;

        self.into_dto(compilation).await
    }

    async fn ensure_events_exist(&self, event_ids: &[i64]) -> Result<()> {
        if event_ids.is_empty() {
            return Ok(());
        }
        let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE id = ANY($1)")
            .bind(event_ids)
            .fetch_one(&self.pool)
            .await?;
        if found as usize != event_ids.len() {
            return Err(AppError::not_found("Some events in the compilation were not found"));
        }
        Ok(())
    }

    async fn into_dto(&self, compilation: Compilation) -> Result<CompilationDto> {
        let records = sqlx::query_as::<_, EventRecord>(&format!(
            "{} JOIN compilation_events ce ON ce.event_id = e.id \
             WHERE ce.compilation_id = $1 ORDER BY e.id",
            EVENT_SELECT
        ))
        .bind(compilation.id)
        .fetch_all(&self.pool)
        .await?;

        let keyed: Vec<_> = records.iter().map(|r| (r.id, r.published_on)).collect();
        let views: HashMap<i64, i64> = event_views(self.stats.as_ref(), &keyed).await;

        let events: Vec<EventShortDto> = records
            .into_iter()
            .map(|r| {
                let v = views.get(&r.id).copied().unwrap_or(0);
                r.into_short_dto(v)
            })
            .collect();

        Ok(CompilationDto {
            id: compilation.id,
            events,
            pinned: compilation.pinned,
            title: compilation.title,
        })
    }
}
