//! Client records and visit metrics

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::{AppointmentDetails, AppointmentQuery},
        client::{Client, ClientQuery, CreateClient, UpdateClient},
    },
    repository::{
        appointments::{AppointmentFilter, ReferenceColumn},
        page_bounds, Repository,
    },
    scheduling::parse_date,
};

#[derive(Clone)]
pub struct ClientsService {
    repository: Repository,
}

impl ClientsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn search(&self, query: &ClientQuery) -> AppResult<(Vec<Client>, i64)> {
        let (page, per_page) = page_bounds(query.page, query.per_page);
        self.repository.clients.search(query, page, per_page).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Client> {
        self.repository.clients.get_by_id(id).await
    }

    pub async fn create(&self, data: CreateClient) -> AppResult<Client> {
        data.validate()?;
        let birth_date = optional_date(data.birth_date.as_deref())?;
        let client = self.repository.clients.create(&data, birth_date).await?;
        tracing::info!(client_id = client.id, "Client created");
        Ok(client)
    }

    pub async fn update(&self, id: i32, data: UpdateClient) -> AppResult<Client> {
        data.validate()?;
        let birth_date = optional_date(data.birth_date.as_deref())?;
        self.repository.clients.update(id, &data, birth_date).await
    }

    /// Delete a client without appointment history
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.clients.get_by_id(id).await?;
        if self.repository.appointments.exists_for(ReferenceColumn::Client, id).await? {
            return Err(AppError::BusinessRule(
                "Client has appointments and cannot be deleted".to_string(),
            ));
        }
        self.repository.clients.delete(id).await?;
        tracing::info!(client_id = id, "Client deleted");
        Ok(())
    }

    /// Appointment history of a client; only the paging fields of `query` apply
    pub async fn appointments(&self, id: i32, query: &AppointmentQuery) -> AppResult<(Vec<AppointmentDetails>, i64)> {
        self.repository.clients.get_by_id(id).await?;
        let filter = AppointmentFilter {
            client_id: Some(id),
            ..Default::default()
        };
        let (page, per_page) = page_bounds(query.page, query.per_page);
        self.repository.appointments.list(&filter, page, per_page).await
    }
}

fn optional_date(value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_date(v.trim(), "birth_date"))
        .transpose()
}

/// Keeps client visit counters in step with completed appointments.
///
/// Runs on the caller's connection so the counters commit or roll back with
/// the status change that triggered them.
#[derive(Clone)]
pub struct ClientMetricsUpdater {
    repository: Repository,
}

impl ClientMetricsUpdater {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn on_appointment_completed(
        &self,
        conn: &mut PgConnection,
        client_id: i32,
        amount: Decimal,
        date: NaiveDate,
    ) -> AppResult<Client> {
        let client = self
            .repository
            .clients
            .record_visit(conn, client_id, amount, date)
            .await?;

        tracing::debug!(
            client_id = client.id,
            total_visits = client.total_visits,
            total_spent = %client.total_spent,
            "Client metrics updated"
        );

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_birth_date() {
        assert_eq!(optional_date(None).unwrap(), None);
        assert_eq!(optional_date(Some("  ")).unwrap(), None);
        assert_eq!(
            optional_date(Some("1990-04-12")).unwrap(),
            NaiveDate::from_ymd_opt(1990, 4, 12)
        );
        assert!(matches!(optional_date(Some("12/04/1990")), Err(AppError::Validation(_))));
    }
}
