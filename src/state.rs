use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::stats_client::ViewTracker;
use crate::services::{
    CategoryService, CommentService, CompilationService, EventService, RequestService, UserService,
};

/// Shared application state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub stats: Arc<dyn ViewTracker>,
    pub user_service: UserService,
    pub category_service: CategoryService,
    pub event_service: EventService,
    pub request_service: RequestService,
    pub comment_service: CommentService,
    pub compilation_service: CompilationService,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, stats: Arc<dyn ViewTracker>) -> Self {
        Self {
            user_service: UserService::new(pool.clone()),
            category_service: CategoryService::new(pool.clone()),
            event_service: EventService::new(pool.clone(), stats.clone()),
            request_service: RequestService::new(pool.clone()),
            comment_service: CommentService::new(pool.clone()),
            compilation_service: CompilationService::new(pool, stats.clone()),
            stats,
            config,
        }
    }
}
