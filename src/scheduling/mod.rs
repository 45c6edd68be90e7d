//! Appointment scheduling rules: double-booking detection, free slots and
//! the status lifecycle.
//!
//! Everything here works on bookings already loaded for one employee and
//! one day; the database is reached only through [`BookingSource`].

mod availability;
mod interval;
pub mod lifecycle;

pub use availability::{AvailableSlots, TimeSlot, WorkingHours};
pub use interval::TimeRange;
pub use lifecycle::Transition;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::{AppError, AppResult};

/// The part of a non-canceled appointment that occupies an employee's time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Booking {
    pub appointment_id: i32,
    pub appointment_time: NaiveTime,
    pub duration_minutes: i32,
}

impl Booking {
    pub fn range(&self) -> TimeRange {
        TimeRange::saturating(self.appointment_time, self.duration_minutes)
    }
}

/// Where the checker reads an employee's day from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingSource: Send + Sync {
    /// Non-canceled bookings of `employee_id` on `date`, ordered by start time
    async fn bookings_for(&self, employee_id: i32, date: NaiveDate) -> AppResult<Vec<Booking>>;
}

/// First booking in `bookings` overlapping `candidate`, ignoring `exclude`
pub fn find_conflict<'a>(
    bookings: &'a [Booking],
    candidate: &TimeRange,
    exclude: Option<i32>,
) -> Option<&'a Booking> {
    bookings
        .iter()
        .filter(|b| Some(b.appointment_id) != exclude)
        .find(|b| b.range().overlaps(candidate))
}

/// Rejects a booking that would overlap an existing one for the same employee
#[derive(Clone)]
pub struct ConflictChecker<S> {
    source: S,
}

impl<S: BookingSource> ConflictChecker<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Whether a booking of `duration_minutes` at `start_time` would overlap
    /// one of the employee's non-canceled appointments
    pub async fn has_conflict(
        &self,
        employee_id: i32,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: i32,
        exclude_appointment_id: Option<i32>,
    ) -> AppResult<bool> {
        let clash = self
            .first_conflict(employee_id, date, start_time, duration_minutes, exclude_appointment_id)
            .await?;
        Ok(clash.is_some())
    }

    /// Like [`has_conflict`](Self::has_conflict) but returns a Conflict error
    /// naming the clashing appointment.
    pub async fn ensure_free(
        &self,
        employee_id: i32,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: i32,
        exclude_appointment_id: Option<i32>,
    ) -> AppResult<()> {
        let clash = self
            .first_conflict(employee_id, date, start_time, duration_minutes, exclude_appointment_id)
            .await?;

        match clash {
            None => Ok(()),
            Some((candidate, existing)) => {
                tracing::info!(
                    employee_id,
                    %date,
                    requested = %candidate,
                    existing_id = existing.appointment_id,
                    "Schedule conflict"
                );
                Err(AppError::Conflict(format!(
                    "Conflito de horário: employee {} already has appointment {} at {} on {}",
                    employee_id,
                    existing.appointment_id,
                    existing.range(),
                    date
                )))
            }
        }
    }

    async fn first_conflict(
        &self,
        employee_id: i32,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: i32,
        exclude_appointment_id: Option<i32>,
    ) -> AppResult<Option<(TimeRange, Booking)>> {
        let candidate = TimeRange::from_duration(start_time, duration_minutes).map_err(AppError::Validation)?;
        let bookings = self.source.bookings_for(employee_id, date).await?;
        Ok(find_conflict(&bookings, &candidate, exclude_appointment_id)
            .cloned()
            .map(|existing| (candidate, existing)))
    }
}

/// Free slots of an employee's day against a working-hours template
#[derive(Clone)]
pub struct AvailabilityCalculator<S> {
    source: S,
    hours: WorkingHours,
}

impl<S: BookingSource> AvailabilityCalculator<S> {
    pub fn new(source: S, hours: WorkingHours) -> Self {
        Self { source, hours }
    }

    pub fn hours(&self) -> &WorkingHours {
        &self.hours
    }

    /// Slots are derived from a fresh read on every call
    pub async fn get_available_slots(
        &self,
        employee_id: i32,
        date: NaiveDate,
        required_minutes: Option<i32>,
    ) -> AppResult<AvailableSlots> {
        let bookings = self.source.bookings_for(employee_id, date).await?;
        Ok(AvailableSlots::new(&self.hours, bookings, required_minutes))
    }
}

/// Parse a `YYYY-MM-DD` request field
pub fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {} (use YYYY-MM-DD)", field)))
}

/// Parse a `HH:MM` (or `HH:MM:SS`) request field
pub fn parse_time(value: &str, field: &str) -> AppResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("Invalid {} (use HH:MM)", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 20).unwrap()
    }

    /// Appointment A: employee 1, 2025-12-20, 09:00, 60 minutes
    fn source_with_a() -> MockBookingSource {
        let mut source = MockBookingSource::new();
        source
            .expect_bookings_for()
            .with(eq(1), eq(day()))
            .returning(|_, _| {
                Ok(vec![Booking {
                    appointment_id: 10,
                    appointment_time: t(9, 0),
                    duration_minutes: 60,
                }])
            });
        source
    }

    #[tokio::test]
    async fn test_overlapping_booking_conflicts() {
        let checker = ConflictChecker::new(source_with_a());
        assert!(checker.has_conflict(1, day(), t(9, 30), 30, None).await.unwrap());

        let err = checker.ensure_free(1, day(), t(9, 30), 30, None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(err.to_string().contains("09:00-10:00"));
    }

    #[tokio::test]
    async fn test_abutting_booking_is_accepted() {
        let checker = ConflictChecker::new(source_with_a());
        assert!(!checker.has_conflict(1, day(), t(10, 0), 30, None).await.unwrap());
        assert!(checker.ensure_free(1, day(), t(10, 0), 30, None).await.is_ok());
        assert!(!checker.has_conflict(1, day(), t(8, 0), 60, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_excludes_itself() {
        let checker = ConflictChecker::new(source_with_a());
        // moving A by 15 minutes only overlaps A itself
        assert!(!checker.has_conflict(1, day(), t(9, 15), 60, Some(10)).await.unwrap());
        assert!(checker.has_conflict(1, day(), t(9, 15), 60, Some(11)).await.unwrap());
    }

    #[test]
    fn test_midnight_crossing_is_a_validation_error() {
        let checker = ConflictChecker::new(source_with_a());
        let err = tokio_test::block_on(checker.has_conflict(1, day(), t(23, 30), 60, None)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_booked_start_is_not_available() {
        let mut source = MockBookingSource::new();
        source.expect_bookings_for().returning(|_, _| {
            Ok(vec![Booking {
                appointment_id: 1,
                appointment_time: t(9, 0),
                duration_minutes: 30,
            }])
        });
        let hours = WorkingHours::new(t(8, 0), t(18, 0), 30).unwrap();
        let calc = AvailabilityCalculator::new(source, hours);

        let slots: Vec<_> = calc.get_available_slots(1, day(), None).await.unwrap().collect();
        assert!(!slots.iter().any(|s| s.start_time == t(9, 0)));
        assert_eq!(slots.len(), 19);
    }

    #[tokio::test]
    async fn test_each_call_reads_fresh_bookings() {
        let mut source = MockBookingSource::new();
        source.expect_bookings_for().times(2).returning(|_, _| Ok(Vec::new()));
        let hours = WorkingHours::new(t(8, 0), t(9, 0), 30).unwrap();
        let calc = AvailabilityCalculator::new(source, hours);

        assert_eq!(calc.get_available_slots(1, day(), None).await.unwrap().count(), 2);
        assert_eq!(calc.get_available_slots(1, day(), None).await.unwrap().count(), 2);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_date("2025-12-20", "date").unwrap(), day());
        assert!(parse_date("20/12/2025", "date").is_err());
        assert_eq!(parse_time("09:30", "time").unwrap(), t(9, 30));
        assert_eq!(parse_time("09:30:00", "time").unwrap(), t(9, 30));
        assert!(parse_time("9h30", "time").is_err());
    }
}
