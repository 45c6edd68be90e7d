//! Employees and specialties repository

use rust_decimal::Decimal;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::employee::{CreateEmployee, Employee, EmployeeStatus, Specialty, UpdateEmployee},
};

#[derive(Clone)]
pub struct EmployeesRepository {
    pool: Pool<Postgres>,
}

impl EmployeesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List employees, optionally by status
    pub async fn list(&self, status: Option<EmployeeStatus>) -> AppResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE ($1::text IS NULL OR status = $1) ORDER BY name, id",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get employee by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))
    }

    /// Create an employee
    pub async fn create(&self, data: &CreateEmployee) -> AppResult<Employee> {
        let row = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (name, phone, email, status, commission_rate)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(&data.phone)
        .bind(&data.email)
        .bind(data.status.unwrap_or(EmployeeStatus::Active))
        .bind(data.commission_rate)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update an employee; absent fields keep their value
    pub async fn update(&self, id: i32, data: &UpdateEmployee) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                status = COALESCE($5, status),
                commission_rate = COALESCE($6, commission_rate),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(&data.phone)
        .bind(&data.email)
        .bind(data.status)
        .bind(data.commission_rate)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))
    }

    /// Delete an employee (cascades to specialties)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Employee {} not found", id)));
        }
        Ok(())
    }

    // ---- Specialties ----

    /// List the services an employee performs
    pub async fn list_specialties(&self, employee_id: i32) -> AppResult<Vec<Specialty>> {
        let rows = sqlx::query_as::<_, Specialty>(
            r#"
            SELECT es.employee_id, es.service_id, s.name AS service_name, es.commission_rate
            FROM employee_specialties es
            JOIN services s ON s.id = es.service_id
            WHERE es.employee_id = $1
            ORDER BY s.name
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Add a specialty or change its commission rate
    pub async fn upsert_specialty(&self, employee_id: i32, service_id: i32, rate: Decimal) -> AppResult<Specialty> {
        sqlx::query(
            r#"
            INSERT INTO employee_specialties (employee_id, service_id, commission_rate)
            VALUES ($1, $2, $3)
            ON CONFLICT (employee_id, service_id) DO UPDATE SET commission_rate = EXCLUDED.commission_rate
            "#,
        )
        .bind(employee_id)
        .bind(service_id)
        .bind(rate)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, Specialty>(
            r#"
            SELECT es.employee_id, es.service_id, s.name AS service_name, es.commission_rate
            FROM employee_specialties es
            JOIN services s ON s.id = es.service_id
            WHERE es.employee_id = $1 AND es.service_id = $2
            "#,
        )
        .bind(employee_id)
        .bind(service_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Remove a specialty
    pub async fn delete_specialty(&self, employee_id: i32, service_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM employee_specialties WHERE employee_id = $1 AND service_id = $2")
            .bind(employee_id)
            .bind(service_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Employee {} has no specialty for service {}",
                employee_id, service_id
            )));
        }
        Ok(())
    }

    /// Commission percentage for an employee performing a service: the
    /// specialty rate when one exists, else the employee's base rate
    pub async fn commission_rate(
        &self,
        conn: &mut PgConnection,
        employee_id: i32,
        service_id: i32,
    ) -> AppResult<Option<Decimal>> {
        let rate: Option<Option<Decimal>> = sqlx::query_scalar(
            r#"
            SELECT COALESCE(es.commission_rate, e.commission_rate)
            FROM employees e
            LEFT JOIN employee_specialties es ON es.employee_id = e.id AND es.service_id = $2
            WHERE e.id = $1
            "#,
        )
        .bind(employee_id)
        .bind(service_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(rate.flatten())
    }
}
