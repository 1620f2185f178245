use sqlx::PgPool;
use tracing::info;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::category::{Category, CategoryDto, NewCategoryDto};
use crate::models::Pagination;

#[derive(Clone)]
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_category(&self, request: NewCategoryDto) -> Result<CategoryDto> {
        request.validate()?;

        // duplicate name surfaces as a unique violation, mapped to 409
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&request.name)
        .fetch_one(&self.pool)
        .await?;

        info!("Created category with id: {}", category.id);
        Ok(category.into())
    }

    pub async fn update_category(&self, cat_id: i64, request: NewCategoryDto) -> Result<CategoryDto> {
        request.validate()?;

        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(cat_id)
        .bind(&request.name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category with id={} was not found", cat_id)))?;

        Ok(category.into())
    }

    pub async fn delete_category(&self, cat_id: i64) -> Result<()> {
        // events referencing the category surface as an FK violation, mapped to 409
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(cat_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category with id={} was not found", cat_id)));
        }

        info!("Deleted category with id: {}", cat_id);
        Ok(())
    }

    pub async fn get_categories(&self, page: Pagination) -> Result<Vec<CategoryDto>> {
        let (limit, offset) = page.limit_offset()?;

        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories.into_iter().map(Into::into).collect())
    }

    pub async fn get_category(&self, cat_id: i64) -> Result<CategoryDto> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(cat_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id={} was not found", cat_id)))?;

        Ok(category.into())
    }
}
