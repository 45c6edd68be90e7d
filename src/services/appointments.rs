//! Appointment scheduling service
//!
//! Create and update run the conflict check before writing; the database
//! exclusion constraint catches whatever slips through between the check and
//! the insert. Status transitions go through [`Transition`], and completion
//! settles commission and client metrics in the same transaction as the
//! status change.

use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::{
            Appointment, AppointmentDetails, AppointmentQuery, AppointmentStatus, AppointmentValues,
            AvailabilityQuery, AvailabilityResponse, CreateAppointment, UpdateAppointment,
        },
        employee::{Employee, EmployeeStatus},
        service::Service,
    },
    repository::{
        appointments::{AppointmentFilter, AppointmentsRepository},
        page_bounds, Repository,
    },
    scheduling::{
        lifecycle::{check_editable, commission_amount},
        parse_date, parse_time, AvailabilityCalculator, ConflictChecker, Transition, WorkingHours,
    },
    services::clients::ClientMetricsUpdater,
};

#[derive(Clone)]
pub struct AppointmentsService {
    repository: Repository,
    conflicts: ConflictChecker<AppointmentsRepository>,
    availability: AvailabilityCalculator<AppointmentsRepository>,
    metrics: ClientMetricsUpdater,
}

impl AppointmentsService {
    pub fn new(repository: Repository, hours: WorkingHours) -> Self {
        Self {
            conflicts: ConflictChecker::new(repository.appointments.clone()),
            availability: AvailabilityCalculator::new(repository.appointments.clone(), hours),
            metrics: ClientMetricsUpdater::new(repository.clone()),
            repository,
        }
    }

    /// List appointments by date, employee, client or status
    pub async fn list(&self, query: &AppointmentQuery) -> AppResult<(Vec<AppointmentDetails>, i64)> {
        let filter = filter_from_query(query)?;
        let (page, per_page) = page_bounds(query.page, query.per_page);
        self.repository.appointments.list(&filter, page, per_page).await
    }

    pub async fn get(&self, id: i32) -> AppResult<AppointmentDetails> {
        self.repository.appointments.get_details(id).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Appointment> {
        self.repository.appointments.get_by_id(id).await
    }

    /// Book an appointment in the `scheduled` state
    pub async fn create(&self, data: CreateAppointment) -> AppResult<AppointmentDetails> {
        data.validate()?;

        let appointment_date = parse_date(&data.appointment_date, "appointment_date")?;
        let appointment_time = parse_time(&data.appointment_time, "appointment_time")?;

        let service = self.bookable_service(data.service_id).await?;
        self.bookable_employee(data.employee_id).await?;
        self.repository.clients.get_by_id(data.client_id).await?;

        let price = data.price.unwrap_or(service.recommended_price);
        check_price(price)?;

        let values = AppointmentValues {
            client_id: data.client_id,
            employee_id: data.employee_id,
            service_id: service.id,
            appointment_date,
            appointment_time,
            duration_minutes: data.duration_minutes.unwrap_or(service.duration_minutes),
            price,
            notes: data.notes,
        };

        self.conflicts
            .ensure_free(
                values.employee_id,
                values.appointment_date,
                values.appointment_time,
                values.duration_minutes,
                None,
            )
            .await?;

        let appointment = self.repository.appointments.create(&values).await?;

        tracing::info!(
            appointment_id = appointment.id,
            employee_id = appointment.employee_id,
            date = %appointment.appointment_date,
            time = %appointment.appointment_time,
            "Appointment scheduled"
        );

        self.repository.appointments.get_details(appointment.id).await
    }

    /// Edit an appointment.
    ///
    /// Open appointments accept any field; completed and canceled ones only
    /// accept notes (see [`check_editable`]). Changing the service re-applies
    /// its duration and price unless those are given explicitly.
    ///
    /// The row stays locked from the status check to the write, so a
    /// concurrent `complete` either sees the edited values or makes this
    /// edit fail the notes-only rule.
    pub async fn update(&self, id: i32, data: UpdateAppointment) -> AppResult<AppointmentDetails> {
        data.validate()?;

        let mut tx = self.repository.pool.begin().await?;
        let current = self.repository.appointments.lock(&mut tx, id).await?;
        check_editable(current.status, &data)?;

        let before = AppointmentValues::from(&current);
        let mut values = before.clone();

        if let Some(client_id) = data.client_id {
            if client_id != values.client_id {
                self.repository.clients.get_by_id(client_id).await?;
                values.client_id = client_id;
            }
        }

        if let Some(employee_id) = data.employee_id {
            if employee_id != values.employee_id {
                self.bookable_employee(employee_id).await?;
                values.employee_id = employee_id;
            }
        }

        if let Some(service_id) = data.service_id {
            if service_id != values.service_id {
                let service = self.bookable_service(service_id).await?;
                values.service_id = service.id;
                values.duration_minutes = service.duration_minutes;
                values.price = service.recommended_price;
            }
        }

        if let Some(ref date) = data.appointment_date {
            values.appointment_date = parse_date(date, "appointment_date")?;
        }
        if let Some(ref time) = data.appointment_time {
            values.appointment_time = parse_time(time, "appointment_time")?;
        }
        if let Some(duration) = data.duration_minutes {
            values.duration_minutes = duration;
        }
        if let Some(price) = data.price {
            values.price = price;
        }
        check_price(values.price)?;
        if data.notes.is_some() {
            values.notes = data.notes;
        }

        if current.status.blocks_schedule() && before.reschedules(&values) {
            self.conflicts
                .ensure_free(
                    values.employee_id,
                    values.appointment_date,
                    values.appointment_time,
                    values.duration_minutes,
                    Some(id),
                )
                .await?;
        }

        let updated = self.repository.appointments.update(&mut tx, id, &values).await?;
        tx.commit().await?;
        tracing::info!(appointment_id = updated.id, "Appointment updated");

        self.repository.appointments.get_details(updated.id).await
    }

    /// Delete an appointment that has not been completed
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;
        let current = self.repository.appointments.lock(&mut tx, id).await?;
        if current.status == AppointmentStatus::Completed {
            return Err(AppError::BusinessRule(
                "Completed appointments cannot be deleted".to_string(),
            ));
        }
        self.repository.appointments.delete(&mut tx, id).await?;
        tx.commit().await?;
        tracing::info!(appointment_id = id, "Appointment deleted");
        Ok(())
    }

    /// scheduled -> confirmed
    pub async fn confirm(&self, id: i32) -> AppResult<AppointmentDetails> {
        self.apply(id, Transition::Confirm).await
    }

    /// scheduled | confirmed -> canceled; frees the slot, no metric changes
    pub async fn cancel(&self, id: i32) -> AppResult<AppointmentDetails> {
        self.apply(id, Transition::Cancel).await
    }

    /// scheduled | confirmed -> completed, then commission and client metrics
    pub async fn complete(&self, id: i32) -> AppResult<AppointmentDetails> {
        let mut tx = self.repository.pool.begin().await?;

        let appointment = self
            .repository
            .appointments
            .transition(&mut tx, id, Transition::Complete)
            .await?;

        let rate = self
            .repository
            .employees
            .commission_rate(&mut tx, appointment.employee_id, appointment.service_id)
            .await?;
        let commission = commission_amount(appointment.price, rate);
        let appointment = self
            .repository
            .appointments
            .set_commission(&mut tx, appointment.id, commission)
            .await?;

        self.metrics
            .on_appointment_completed(
                &mut tx,
                appointment.client_id,
                appointment.price,
                appointment.appointment_date,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            appointment_id = appointment.id,
            employee_id = appointment.employee_id,
            price = %appointment.price,
            commission = ?appointment.commission_amount,
            "Appointment completed"
        );

        self.repository.appointments.get_details(appointment.id).await
    }

    async fn apply(&self, id: i32, transition: Transition) -> AppResult<AppointmentDetails> {
        let mut tx = self.repository.pool.begin().await?;
        let appointment = self
            .repository
            .appointments
            .transition(&mut tx, id, transition)
            .await?;
        tx.commit().await?;

        tracing::info!(
            appointment_id = appointment.id,
            status = %appointment.status,
            "Appointment {}",
            transition.target()
        );

        self.repository.appointments.get_details(appointment.id).await
    }

    /// Free slots for an employee on a day
    pub async fn available_slots(&self, query: &AvailabilityQuery) -> AppResult<AvailabilityResponse> {
        let date = parse_date(&query.date, "date")?;
        let employee = self.repository.employees.get_by_id(query.employee_id).await?;

        let required_minutes = match (query.duration_minutes, query.service_id) {
            (Some(minutes), _) if minutes <= 0 => {
                return Err(AppError::Validation("duration_minutes must be positive".to_string()));
            }
            (Some(minutes), _) => Some(minutes),
            (None, Some(service_id)) => {
                Some(self.repository.catalog.get_by_id(service_id).await?.duration_minutes)
            }
            (None, None) => None,
        };

        let hours = self.availability.hours();
        let slots = if employee.status == EmployeeStatus::Active {
            self.availability
                .get_available_slots(employee.id, date, required_minutes)
                .await?
                .collect()
        } else {
            Vec::new()
        };

        Ok(AvailabilityResponse {
            employee_id: employee.id,
            date,
            slot_minutes: hours.slot_minutes(),
            slots,
        })
    }

    async fn bookable_service(&self, id: i32) -> AppResult<Service> {
        let service = self.repository.catalog.get_by_id(id).await?;
        if !service.active {
            return Err(AppError::BusinessRule(format!(
                "Service '{}' is no longer offered",
                service.name
            )));
        }
        Ok(service)
    }

    async fn bookable_employee(&self, id: i32) -> AppResult<Employee> {
        let employee = self.repository.employees.get_by_id(id).await?;
        if employee.status != EmployeeStatus::Active {
            return Err(AppError::BusinessRule(format!(
                "Employee '{}' is inactive",
                employee.name
            )));
        }
        Ok(employee)
    }
}

fn check_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ZERO {
        return Err(AppError::Validation("Price cannot be negative".to_string()));
    }
    Ok(())
}

/// Turn request filters into typed ones; `date` wins over a range
fn filter_from_query(query: &AppointmentQuery) -> AppResult<AppointmentFilter> {
    let (start_date, end_date) = match query.date {
        Some(ref date) => {
            let day = parse_date(date, "date")?;
            (Some(day), Some(day))
        }
        None => (
            query.start_date.as_deref().map(|d| parse_date(d, "start_date")).transpose()?,
            query.end_date.as_deref().map(|d| parse_date(d, "end_date")).transpose()?,
        ),
    };

    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<AppointmentStatus>().map_err(AppError::Validation))
        .transpose()?;

    let client_search = query
        .client_search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(AppointmentFilter {
        start_date,
        end_date,
        employee_id: query.employee_id,
        client_id: query.client_id,
        client_search,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_single_date_filter() {
        let query = AppointmentQuery {
            date: Some("2025-12-20".to_string()),
            start_date: Some("2025-01-01".to_string()),
            ..Default::default()
        };
        let filter = filter_from_query(&query).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        assert_eq!(filter.start_date, Some(day));
        assert_eq!(filter.end_date, Some(day));
    }

    #[test]
    fn test_status_and_search_filters() {
        let query = AppointmentQuery {
            status: Some("confirmed".to_string()),
            client_search: Some("  ".to_string()),
            employee_id: Some(2),
            ..Default::default()
        };
        let filter = filter_from_query(&query).unwrap();
        assert_eq!(filter.status, Some(AppointmentStatus::Confirmed));
        assert_eq!(filter.client_search, None);
        assert_eq!(filter.employee_id, Some(2));
    }

    #[test]
    fn test_bad_filters_are_validation_errors() {
        let bad_status = AppointmentQuery {
            status: Some("done".to_string()),
            ..Default::default()
        };
        assert!(matches!(filter_from_query(&bad_status), Err(AppError::Validation(_))));

        let bad_date = AppointmentQuery {
            start_date: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(matches!(filter_from_query(&bad_date), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_negative_price_rejected() {
        assert!(check_price(Decimal::new(-1, 2)).is_err());
        assert!(check_price(Decimal::ZERO).is_ok());
    }
}
