//! Service catalog management

use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::service::{CreateService, Service, ServiceQuery, UpdateService},
    repository::{appointments::ReferenceColumn, Repository},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &ServiceQuery) -> AppResult<Vec<Service>> {
        self.repository.catalog.list(query.active_only.unwrap_or(false)).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Service> {
        self.repository.catalog.get_by_id(id).await
    }

    pub async fn create(&self, data: CreateService) -> AppResult<Service> {
        data.validate()?;
        check_price(data.recommended_price)?;
        let service = self.repository.catalog.create(&data).await?;
        tracing::info!(service_id = service.id, name = %service.name, "Service created");
        Ok(service)
    }

    pub async fn update(&self, id: i32, data: UpdateService) -> AppResult<Service> {
        data.validate()?;
        if let Some(price) = data.recommended_price {
            check_price(price)?;
        }
        self.repository.catalog.update(id, &data).await
    }

    /// Delete a service nobody booked; otherwise it should be deactivated
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.catalog.get_by_id(id).await?;
        if self.repository.appointments.exists_for(ReferenceColumn::Service, id).await? {
            return Err(AppError::BusinessRule(
                "Service has appointments; deactivate it instead".to_string(),
            ));
        }
        self.repository.catalog.delete(id).await?;
        tracing::info!(service_id = id, "Service deleted");
        Ok(())
    }
}

fn check_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ZERO {
        return Err(AppError::Validation("Recommended price cannot be negative".to_string()));
    }
    Ok(())
}
