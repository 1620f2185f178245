use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch, post};
use axum::Router;

use crate::error::Result;
use crate::models::category::{CategoryDto, NewCategoryDto};
use crate::models::Pagination;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/:cat_id", get(get_category))
        .route("/admin/categories", post(create_category))
        .route("/admin/categories/:cat_id", patch(update_category).delete(delete_category))
}

/// GET /categories
async fn get_categories(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<CategoryDto>>> {
    let categories = state.category_service.get_categories(page).await?;
    Ok(Json(categories))
}

/// GET /categories/:cat_id
async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(cat_id): Path<i64>,
) -> Result<Json<CategoryDto>> {
    let category = state.category_service.get_category(cat_id).await?;
    Ok(Json(category))
}

/// POST /admin/categories
async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewCategoryDto>,
) -> Result<(StatusCode, Json<CategoryDto>)> {
    let category = state.category_service.create_category(request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PATCH /admin/categories/:cat_id
async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(cat_id): Path<i64>,
    Json(request): Json<NewCategoryDto>,
) -> Result<Json<CategoryDto>> {
    let category = state.category_service.update_category(cat_id, request).await?;
    Ok(Json(category))
}

/// DELETE /admin/categories/:cat_id
async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(cat_id): Path<i64>,
) -> Result<StatusCode> {
    state.category_service.delete_category(cat_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
