//! Business logic services

pub mod appointments;
pub mod catalog;
pub mod clients;
pub mod employees;
pub mod users;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub appointments: appointments::AppointmentsService,
    pub catalog: catalog::CatalogService,
    pub clients: clients::ClientsService,
    pub employees: employees::EmployeesService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let hours = config
            .scheduling
            .working_hours()
            .map_err(|e| crate::error::AppError::Internal(e.to_string()))?;

        Ok(Self {
            appointments: appointments::AppointmentsService::new(repository.clone(), hours),
            catalog: catalog::CatalogService::new(repository.clone()),
            clients: clients::ClientsService::new(repository.clone()),
            employees: employees::EmployeesService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), config.auth.clone()),
            repository,
        })
    }

    /// Whether the database answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await?;
        Ok(())
    }
}
