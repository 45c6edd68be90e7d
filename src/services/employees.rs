//! Employees and their specialties

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::employee::{
        validate_commission_rate, CreateEmployee, Employee, EmployeeQuery, EmployeeStatus, SetSpecialty,
        Specialty, UpdateEmployee,
    },
    repository::{appointments::ReferenceColumn, Repository},
};

#[derive(Clone)]
pub struct EmployeesService {
    repository: Repository,
}

impl EmployeesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &EmployeeQuery) -> AppResult<Vec<Employee>> {
        let status = query
            .status
            .as_deref()
            .map(|s| s.parse::<EmployeeStatus>().map_err(AppError::Validation))
            .transpose()?;
        self.repository.employees.list(status).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Employee> {
        self.repository.employees.get_by_id(id).await
    }

    pub async fn create(&self, data: CreateEmployee) -> AppResult<Employee> {
        data.validate()?;
        if let Some(rate) = data.commission_rate {
            validate_commission_rate(rate).map_err(AppError::Validation)?;
        }
        let employee = self.repository.employees.create(&data).await?;
        tracing::info!(employee_id = employee.id, "Employee created");
        Ok(employee)
    }

    /// Update an employee. Deactivating does not touch booked appointments;
    /// it only stops new bookings.
    pub async fn update(&self, id: i32, data: UpdateEmployee) -> AppResult<Employee> {
        data.validate()?;
        if let Some(rate) = data.commission_rate {
            validate_commission_rate(rate).map_err(AppError::Validation)?;
        }
        self.repository.employees.update(id, &data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.employees.get_by_id(id).await?;
        if self.repository.appointments.exists_for(ReferenceColumn::Employee, id).await? {
            return Err(AppError::BusinessRule(
                "Employee has appointments; set the status to inactive instead".to_string(),
            ));
        }
        self.repository.employees.delete(id).await?;
        tracing::info!(employee_id = id, "Employee deleted");
        Ok(())
    }

    pub async fn specialties(&self, employee_id: i32) -> AppResult<Vec<Specialty>> {
        self.repository.employees.get_by_id(employee_id).await?;
        self.repository.employees.list_specialties(employee_id).await
    }

    /// Add a specialty or change its commission rate
    pub async fn set_specialty(&self, employee_id: i32, data: SetSpecialty) -> AppResult<Specialty> {
        validate_commission_rate(data.commission_rate).map_err(AppError::Validation)?;
        self.repository.employees.get_by_id(employee_id).await?;
        self.repository.catalog.get_by_id(data.service_id).await?;

        let specialty = self
            .repository
            .employees
            .upsert_specialty(employee_id, data.service_id, data.commission_rate)
            .await?;
        tracing::info!(
            employee_id,
            service_id = data.service_id,
            commission_rate = %data.commission_rate,
            "Specialty set"
        );
        Ok(specialty)
    }

    pub async fn remove_specialty(&self, employee_id: i32, service_id: i32) -> AppResult<()> {
        self.repository.employees.delete_specialty(employee_id, service_id).await
    }
}
