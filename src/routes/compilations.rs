use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch, post};
use axum::Router;
use serde::Deserialize;

use crate::error::Result;
use crate::models::compilation::{CompilationDto, NewCompilationDto, UpdateCompilationRequest};
use crate::models::Pagination;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/compilations", get(get_compilations))
        .route("/compilations/:comp_id", get(get_compilation))
        .route("/admin/compilations", post(create_compilation))
        .route(
            "/admin/compilations/:comp_id",
            patch(update_compilation).delete(delete_compilation),
        )
}

#[derive(Debug, Deserialize)]
struct CompilationListParams {
    pinned: Option<bool>,
    from: Option<i64>,
    size: Option<i64>,
}

/// GET /compilations
async fn get_compilations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompilationListParams>,
) -> Result<Json<Vec<CompilationDto>>> {
    let page = Pagination::new(params.from, params.size);
    let compilations = state.compilation_service.get_compilations(params.pinned, page).await?;
    Ok(Json(compilations))
}

/// GET /compilations/:comp_id
async fn get_compilation(
    State(state): State<Arc<AppState>>,
    Path(comp_id): Path<i64>,
) -> Result<Json<CompilationDto>> {
    let compilation = state.compilation_service.get_compilation(comp_id).await?;
    Ok(Json(compilation))
}

/// POST /admin/compilations
async fn create_compilation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewCompilationDto>,
) -> Result<(StatusCode, Json<CompilationDto>)> {
    let compilation = state.compilation_service.create_compilation(request).await?;
    Ok((StatusCode::CREATED, Json(compilation)))
}

/// PATCH /admin/compilations/:comp_id
async fn update_compilation(
    State(state): State<Arc<AppState>>,
    Path(comp_id): Path<i64>,
    Json(request): Json<UpdateCompilationRequest>,
) -> Result<Json<CompilationDto>> {
    let compilation = state.compilation_service.update_compilation(comp_id, request).await?;
    Ok(Json(compilation))
}

/// DELETE /admin/compilations/:comp_id
async fn delete_compilation(
    State(state): State<Arc<AppState>>,
    Path(comp_id): Path<i64>,
) -> Result<StatusCode> {
    state.compilation_service.delete_compilation(comp_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
