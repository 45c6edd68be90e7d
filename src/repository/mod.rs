//! Repository layer for database operations

pub mod appointments;
pub mod catalog;
pub mod clients;
pub mod employees;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub appointments: appointments::AppointmentsRepository,
    pub clients: clients::ClientsRepository,
    pub employees: employees::EmployeesRepository,
    pub catalog: catalog::CatalogRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            appointments: appointments::AppointmentsRepository::new(pool.clone()),
            clients: clients::ClientsRepository::new(pool.clone()),
            employees: employees::EmployeesRepository::new(pool.clone()),
            catalog: catalog::CatalogRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

const MAX_PAGE: i64 = 1_000_000;
const MAX_PER_PAGE: i64 = 200;

/// Clamp `page`/`per_page` request parameters
pub fn page_bounds(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    let per_page = per_page.unwrap_or(50).clamp(1, MAX_PER_PAGE);
    (page, per_page)
}

/// Row offset of a page returned by [`page_bounds`]
pub fn page_offset(page: i64, per_page: i64) -> i64 {
    page.saturating_sub(1).max(0).saturating_mul(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(None, None), (1, 50));
        assert_eq!(page_bounds(Some(0), Some(0)), (1, 1));
        assert_eq!(page_bounds(Some(3), Some(1000)), (3, 200));
        assert_eq!(page_bounds(Some(i64::MAX), Some(200)), (MAX_PAGE, 200));
        assert_eq!(page_bounds(Some(i64::MIN), None), (1, 50));
    }

    #[test]
    fn test_page_offset_never_overflows() {
        let (page, per_page) = page_bounds(Some(i64::MAX), Some(i64::MAX));
        assert_eq!(page_offset(page, per_page), (MAX_PAGE - 1) * MAX_PER_PAGE);
        assert_eq!(page_offset(1, 50), 0);
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(i64::MAX, i64::MAX), i64::MAX);
    }
}
