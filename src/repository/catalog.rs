//! Service catalog repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::service::{CreateService, Service, UpdateService},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: Pool<Postgres>,
}

impl CatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, active_only: bool) -> AppResult<Vec<Service>> {
        let rows = sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE ($1 = FALSE OR active) ORDER BY name, id",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Service> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))
    }

    pub async fn create(&self, data: &CreateService) -> AppResult<Service> {
        let row = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, description, recommended_price, duration_minutes, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(&data.description)
        .bind(data.recommended_price)
        .bind(data.duration_minutes)
        .bind(data.active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a service; existing appointments keep the price and duration
    /// they were booked with
    pub async fn update(&self, id: i32, data: &UpdateService) -> AppResult<Service> {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                recommended_price = COALESCE($4, recommended_price),
                duration_minutes = COALESCE($5, duration_minutes),
                active = COALESCE($6, active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(&data.description)
        .bind(data.recommended_price)
        .bind(data.duration_minutes)
        .bind(data.active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Service {} not found", id)));
        }
        Ok(())
    }
}
