//! Appointments repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::appointment::{Appointment, AppointmentDetails, AppointmentStatus, AppointmentValues},
    repository::page_offset,
    scheduling::{Booking, BookingSource, Transition},
};

const DETAILS_SELECT: &str = r#"
    SELECT a.id, a.client_id, c.name AS client_name, c.phone AS client_phone,
           a.employee_id, e.name AS employee_name,
           a.service_id, s.name AS service_name,
           a.appointment_date, a.appointment_time, a.duration_minutes, a.status,
           a.price, a.commission_amount, a.notes, a.created_at, a.updated_at
    FROM appointments a
    JOIN clients c ON c.id = a.client_id
    JOIN employees e ON e.id = a.employee_id
    JOIN services s ON s.id = a.service_id
"#;

/// Parsed appointment list filters; `None` means "any"
#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub employee_id: Option<i32>,
    pub client_id: Option<i32>,
    pub client_search: Option<String>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Clone)]
pub struct AppointmentsRepository {
    pool: Pool<Postgres>,
}

impl AppointmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List appointments matching `filter`, ordered by date and time
    pub async fn list(
        &self,
        filter: &AppointmentFilter,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<AppointmentDetails>, i64)> {
        let offset = page_offset(page, per_page);
        let search = filter
            .client_search
            .as_ref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let where_clause = r#"
            WHERE ($1::date IS NULL OR a.appointment_date >= $1)
              AND ($2::date IS NULL OR a.appointment_date <= $2)
              AND ($3::int IS NULL OR a.employee_id = $3)
              AND ($4::int IS NULL OR a.client_id = $4)
              AND ($5::text IS NULL OR LOWER(c.name) LIKE $5 OR c.phone LIKE $5)
              AND ($6::text IS NULL OR a.status = $6)
        "#;

        let count_q = format!(
            "SELECT COUNT(*) FROM appointments a JOIN clients c ON c.id = a.client_id {}",
            where_clause
        );
        let total = sqlx::query_scalar::<_, i64>(&count_q)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.employee_id)
            .bind(filter.client_id)
            .bind(search.as_deref())
            .bind(filter.status)
            .fetch_one(&self.pool)
            .await?;

        let select_q = format!(
            "{} {} ORDER BY a.appointment_date, a.appointment_time, a.id LIMIT {} OFFSET {}",
            DETAILS_SELECT, where_clause, per_page, offset
        );
        let rows = sqlx::query_as::<_, AppointmentDetails>(&select_q)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.employee_id)
            .bind(filter.client_id)
            .bind(search.as_deref())
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Get appointment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Appointment> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    /// Get appointment by ID with client, employee and service names
    pub async fn get_details(&self, id: i32) -> AppResult<AppointmentDetails> {
        let query = format!("{} WHERE a.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, AppointmentDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    /// Insert a new appointment in the `scheduled` state
    pub async fn create(&self, values: &AppointmentValues) -> AppResult<Appointment> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                client_id, employee_id, service_id, appointment_date, appointment_time,
                duration_minutes, status, price, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(values.client_id)
        .bind(values.employee_id)
        .bind(values.service_id)
        .bind(values.appointment_date)
        .bind(values.appointment_time)
        .bind(values.duration_minutes)
        .bind(AppointmentStatus::Scheduled)
        .bind(values.price)
        .bind(&values.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Load an appointment and hold its row lock until the transaction on
    /// `conn` ends. Status transitions on the same row wait for it.
    pub async fn lock(&self, conn: &mut PgConnection, id: i32) -> AppResult<Appointment> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    /// Overwrite the editable fields of an appointment locked with [`lock`](Self::lock)
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i32,
        values: &AppointmentValues,
    ) -> AppResult<Appointment> {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET client_id = $2, employee_id = $3, service_id = $4,
                appointment_date = $5, appointment_time = $6, duration_minutes = $7,
                price = $8, notes = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(values.client_id)
        .bind(values.employee_id)
        .bind(values.service_id)
        .bind(values.appointment_date)
        .bind(values.appointment_time)
        .bind(values.duration_minutes)
        .bind(values.price)
        .bind(&values.notes)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    /// Delete an appointment locked with [`lock`](Self::lock)
    pub async fn delete(&self, conn: &mut PgConnection, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Appointment {} not found", id)));
        }
        Ok(())
    }

    /// Move an appointment to the transition's target status.
    ///
    /// The status check and the write are a single UPDATE, so two concurrent
    /// requests cannot both apply the same transition.
    pub async fn transition(
        &self,
        conn: &mut PgConnection,
        id: i32,
        transition: Transition,
    ) -> AppResult<Appointment> {
        let allowed: Vec<&str> = transition.allowed_from().iter().map(|s| s.as_str()).collect();

        let updated = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = ANY($3)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(transition.target())
        .bind(allowed)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(appointment) = updated {
            return Ok(appointment);
        }

        let current: Option<AppointmentStatus> =
            sqlx::query_scalar("SELECT status FROM appointments WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        match current {
            None => Err(AppError::NotFound(format!("Appointment {} not found", id))),
            Some(status) => Err(transition.rejected(status)),
        }
    }

    /// Record the commission owed on a completed appointment
    pub async fn set_commission(
        &self,
        conn: &mut PgConnection,
        id: i32,
        amount: Option<Decimal>,
    ) -> AppResult<Appointment> {
        let row = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET commission_amount = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(amount)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Whether any appointment references the given column value
    pub async fn exists_for(&self, column: ReferenceColumn, id: i32) -> AppResult<bool> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM appointments WHERE {} = $1)",
            column.as_str()
        );
        let exists: bool = sqlx::query_scalar(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

/// Foreign keys held by an appointment
#[derive(Debug, Clone, Copy)]
pub enum ReferenceColumn {
    Client,
    Employee,
    Service,
}

impl ReferenceColumn {
    fn as_str(self) -> &'static str {
        match self {
            ReferenceColumn::Client => "client_id",
            ReferenceColumn::Employee => "employee_id",
            ReferenceColumn::Service => "service_id",
        }
    }
}

#[async_trait]
impl BookingSource for AppointmentsRepository {
    async fn bookings_for(&self, employee_id: i32, date: NaiveDate) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id AS appointment_id, appointment_time, duration_minutes
            FROM appointments
            WHERE employee_id = $1 AND appointment_date = $2 AND status <> $3
            ORDER BY appointment_time
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(AppointmentStatus::Canceled)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
