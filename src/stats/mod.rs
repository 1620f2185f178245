pub mod routes;
pub mod service;

use sqlx::PgPool;

/// Shared state for the hit-tracking service.
pub struct StatsState {
    pub service: service::StatsService,
}

impl StatsState {
    pub fn new(pool: PgPool) -> Self {
        Self { service: service::StatsService::new(pool) }
    }
}
