//! Appointment model and related types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::scheduling::TimeSlot;

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Canceled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Canceled => "canceled",
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Canceled)
    }

    /// Whether the appointment still occupies the employee's time
    pub fn blocks_schedule(&self) -> bool {
        !matches!(self, AppointmentStatus::Canceled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            // both spellings show up in clients
            "canceled" | "cancelled" => Ok(AppointmentStatus::Canceled),
            _ => Err(format!("Invalid appointment status: {}", s)),
        }
    }
}

// Stored as TEXT (with a CHECK constraint)
impl sqlx::Type<Postgres> for AppointmentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for AppointmentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AppointmentStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Appointment row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Appointment {
    pub id: i32,
    pub client_id: i32,
    pub employee_id: i32,
    pub service_id: i32,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    /// Copied from the service at creation unless overridden
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    /// Copied from the service's recommended price unless overridden
    #[schema(value_type = String)]
    pub price: Decimal,
    /// Set on completion
    #[schema(value_type = Option<String>)]
    pub commission_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Appointment with client, employee and service names for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AppointmentDetails {
    pub id: i32,
    pub client_id: i32,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub employee_id: i32,
    pub employee_name: String,
    pub service_id: i32,
    pub service_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = Option<String>)]
    pub commission_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create appointment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAppointment {
    pub client_id: i32,
    pub employee_id: i32,
    pub service_id: i32,
    /// Date (YYYY-MM-DD)
    pub appointment_date: String,
    /// Start time (HH:MM)
    pub appointment_time: String,
    /// Defaults to the service duration
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: Option<i32>,
    /// Defaults to the service's recommended price
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Update appointment request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAppointment {
    pub client_id: Option<i32>,
    pub employee_id: Option<i32>,
    pub service_id: Option<i32>,
    /// Date (YYYY-MM-DD)
    pub appointment_date: Option<String>,
    /// Start time (HH:MM)
    pub appointment_time: Option<String>,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

impl UpdateAppointment {
    pub fn only_touches_notes(&self) -> bool {
        self.client_id.is_none()
            && self.employee_id.is_none()
            && self.service_id.is_none()
            && self.appointment_date.is_none()
            && self.appointment_time.is_none()
            && self.duration_minutes.is_none()
            && self.price.is_none()
    }
}

/// Fully resolved values written by create and update
#[derive(Debug, Clone)]
pub struct AppointmentValues {
    pub client_id: i32,
    pub employee_id: i32,
    pub service_id: i32,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub notes: Option<String>,
}

impl AppointmentValues {
    /// Whether moving from `self` to `other` changes when or by whom the work is done
    pub fn reschedules(&self, other: &AppointmentValues) -> bool {
        self.employee_id != other.employee_id
            || self.appointment_date != other.appointment_date
            || self.appointment_time != other.appointment_time
            || self.duration_minutes != other.duration_minutes
    }
}

impl From<&Appointment> for AppointmentValues {
    fn from(a: &Appointment) -> Self {
        Self {
            client_id: a.client_id,
            employee_id: a.employee_id,
            service_id: a.service_id,
            appointment_date: a.appointment_date,
            appointment_time: a.appointment_time,
            duration_minutes: a.duration_minutes,
            price: a.price,
            notes: a.notes.clone(),
        }
    }
}

/// Appointment list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AppointmentQuery {
    /// Single day (YYYY-MM-DD)
    pub date: Option<String>,
    /// Range start, inclusive (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Range end, inclusive (YYYY-MM-DD)
    pub end_date: Option<String>,
    pub employee_id: Option<i32>,
    pub client_id: Option<i32>,
    /// Matches client name or phone
    pub client_search: Option<String>,
    /// scheduled, confirmed, completed or canceled
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Availability query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    pub employee_id: i32,
    /// Day (YYYY-MM-DD)
    pub date: String,
    /// Only keep slots where this service fits
    pub service_id: Option<i32>,
    /// Only keep slots where a booking this long fits
    pub duration_minutes: Option<i32>,
}

/// Free slots of an employee for a day
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub employee_id: i32,
    pub date: NaiveDate,
    pub slot_minutes: u32,
    pub slots: Vec<TimeSlot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("scheduled".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Scheduled);
        assert_eq!("Cancelled".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Canceled);
        assert!("pending".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_status_json() {
        let json = serde_json::to_string(&AppointmentStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
    }

    #[test]
    fn test_terminal_states() {
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Canceled.is_terminal());
        assert!(!AppointmentStatus::Scheduled.is_terminal());
        assert!(!AppointmentStatus::Confirmed.is_terminal());
        assert!(!AppointmentStatus::Canceled.blocks_schedule());
        assert!(AppointmentStatus::Completed.blocks_schedule());
    }

    #[test]
    fn test_reschedule_detection() {
        let base = AppointmentValues {
            client_id: 1,
            employee_id: 1,
            service_id: 1,
            appointment_date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration_minutes: 60,
            price: Decimal::new(5000, 2),
            notes: None,
        };

        let repriced = AppointmentValues {
            price: Decimal::new(6000, 2),
            notes: Some("vip".to_string()),
            ..base.clone()
        };
        assert!(!base.reschedules(&repriced));

        let moved = AppointmentValues {
            appointment_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            ..base.clone()
        };
        assert!(base.reschedules(&moved));

        let reassigned = AppointmentValues { employee_id: 2, ..base.clone() };
        assert!(base.reschedules(&reassigned));
    }
}
