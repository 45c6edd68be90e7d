//! Clients repository

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::client::{Client, ClientQuery, CreateClient, UpdateClient},
    repository::page_offset,
};

#[derive(Clone)]
pub struct ClientsRepository {
    pool: Pool<Postgres>,
}

impl ClientsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search clients by name, phone or email with pagination
    pub async fn search(&self, query: &ClientQuery, page: i64, per_page: i64) -> AppResult<(Vec<Client>, i64)> {
        let offset = page_offset(page, per_page);

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref search) = query.search {
            let search = search.trim();
            if !search.is_empty() {
                params.push(format!("%{}%", search.to_lowercase()));
                conditions.push(format!(
                    "(LOWER(name) LIKE ${0} OR phone LIKE ${0} OR LOWER(email) LIKE ${0})",
                    params.len()
                ));
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM clients {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM clients {} ORDER BY name, id LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, Client>(&select_query);
        for param in &params {
            builder = builder.bind(param);
        }
        let clients = builder.fetch_all(&self.pool).await?;

        Ok((clients, total))
    }

    /// Get client by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Client> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client {} not found", id)))
    }

    /// Create a client with zeroed visit counters
    pub async fn create(&self, data: &CreateClient, birth_date: Option<NaiveDate>) -> AppResult<Client> {
        let row = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, phone, email, birth_date, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(&data.phone)
        .bind(&data.email)
        .bind(birth_date)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update contact fields; visit counters are never touched here
    pub async fn update(&self, id: i32, data: &UpdateClient, birth_date: Option<NaiveDate>) -> AppResult<Client> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 2;

        if data.name.is_some() { sets.push(format!("name = ${}", idx)); idx += 1; }
        if data.phone.is_some() { sets.push(format!("phone = ${}", idx)); idx += 1; }
        if data.email.is_some() { sets.push(format!("email = ${}", idx)); idx += 1; }
        if birth_date.is_some() { sets.push(format!("birth_date = ${}", idx)); idx += 1; }
        if data.notes.is_some() { sets.push(format!("notes = ${}", idx)); }

        let query = format!("UPDATE clients SET {} WHERE id = $1 RETURNING *", sets.join(", "));

        let mut builder = sqlx::query_as::<_, Client>(&query).bind(id);
        if let Some(ref name) = data.name { builder = builder.bind(name.trim()); }
        if let Some(ref phone) = data.phone { builder = builder.bind(phone); }
        if let Some(ref email) = data.email { builder = builder.bind(email); }
        if let Some(bd) = birth_date { builder = builder.bind(bd); }
        if let Some(ref notes) = data.notes { builder = builder.bind(notes); }

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client {} not found", id)))
    }

    /// Delete a client
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Client {} not found", id)));
        }
        Ok(())
    }

    /// Count one completed visit: +1 visit, +amount spent, last visit set to
    /// `date`, first visit set if it was never recorded.
    ///
    /// Counters only grow; nothing undoes a recorded visit.
    pub async fn record_visit(
        &self,
        conn: &mut PgConnection,
        client_id: i32,
        amount: Decimal,
        date: NaiveDate,
    ) -> AppResult<Client> {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET total_visits = total_visits + 1,
                total_spent = total_spent + $2,
                last_visit = $3,
                first_visit = COALESCE(first_visit, $3),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(amount)
        .bind(date)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client {} not found", client_id)))
    }
}
