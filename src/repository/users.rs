//! Staff users repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY login")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn get_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(login) = LOWER($1)")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a user; `password_hash` must already be hashed
    pub async fn create(
        &self,
        login: &str,
        password_hash: &str,
        name: &str,
        role: Role,
        employee_id: Option<i32>,
    ) -> AppResult<User> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(login) = LOWER($1))")
            .bind(login)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            return Err(AppError::Conflict(format!("Login '{}' is already taken", login)));
        }

        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, password, name, role, employee_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(login)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
