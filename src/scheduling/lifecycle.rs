//! Appointment status machine
//!
//! ```text
//! scheduled ──confirm──▶ confirmed
//!     │                      │
//!     ├──complete──▶ completed ◀──complete──┤
//!     └──cancel────▶ canceled  ◀──cancel────┘
//! ```
//!
//! `completed` and `canceled` are terminal. A transition is accepted only
//! when the current status is one of its allowed predecessors, which also
//! makes a repeated `complete` fail instead of counting the visit twice.

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::appointment::{AppointmentStatus, UpdateAppointment},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Confirm,
    Complete,
    Cancel,
}

impl Transition {
    pub fn target(self) -> AppointmentStatus {
        match self {
            Transition::Confirm => AppointmentStatus::Confirmed,
            Transition::Complete => AppointmentStatus::Completed,
            Transition::Cancel => AppointmentStatus::Canceled,
        }
    }

    pub fn allowed_from(self) -> &'static [AppointmentStatus] {
        match self {
            Transition::Confirm => &[AppointmentStatus::Scheduled],
            Transition::Complete | Transition::Cancel => {
                &[AppointmentStatus::Scheduled, AppointmentStatus::Confirmed]
            }
        }
    }

    #[cfg(test)]
    fn permits(self, current: AppointmentStatus) -> bool {
        self.allowed_from().contains(&current)
    }

    /// Error for an appointment found in `current` when this transition was requested
    pub fn rejected(self, current: AppointmentStatus) -> AppError {
        AppError::InvalidTransition(format!(
            "Cannot {} an appointment that is {}",
            self.verb(),
            current
        ))
    }

    pub fn verb(self) -> &'static str {
        match self {
            Transition::Confirm => "confirm",
            Transition::Complete => "complete",
            Transition::Cancel => "cancel",
        }
    }
}

/// Commission owed on a completed appointment, `rate` being a percentage
pub fn commission_amount(price: Decimal, rate: Option<Decimal>) -> Option<Decimal> {
    rate.map(|r| (price * r / Decimal::ONE_HUNDRED).round_dp(2))
}

/// Edit policy.
///
/// Open appointments (scheduled, confirmed) accept any change. Completed and
/// canceled appointments only accept a new `notes` value: their commission
/// and the client's counters were settled from the booked values, and
/// nothing reverses or reapplies them.
pub fn check_editable(status: AppointmentStatus, changes: &UpdateAppointment) -> AppResult<()> {
    if !status.is_terminal() || changes.only_touches_notes() {
        return Ok(());
    }
    Err(AppError::InvalidTransition(format!(
        "Appointment is {}; only notes can be edited",
        status
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    #[test]
    fn test_confirm_only_from_scheduled() {
        assert!(Transition::Confirm.permits(Scheduled));
        assert!(!Transition::Confirm.permits(Confirmed));
        assert!(!Transition::Confirm.permits(Completed));
        assert!(!Transition::Confirm.permits(Canceled));
    }

    #[test]
    fn test_complete_and_cancel_from_open_states() {
        for t in [Transition::Complete, Transition::Cancel] {
            assert!(t.permits(Scheduled));
            assert!(t.permits(Confirmed));
            assert!(!t.permits(Completed));
            assert!(!t.permits(Canceled));
        }
    }

    #[test]
    fn test_second_completion_is_rejected() {
        assert!(!Transition::Complete.permits(Completed));
        let err = Transition::Complete.rejected(Completed);
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert!(err.to_string().contains("completed"));
    }

    #[test]
    fn test_targets() {
        assert_eq!(Transition::Confirm.target(), Confirmed);
        assert_eq!(Transition::Complete.target(), Completed);
        assert_eq!(Transition::Cancel.target(), Canceled);
    }

    #[test]
    fn test_commission_amount() {
        let price = Decimal::new(5000, 2);
        assert_eq!(commission_amount(price, Some(Decimal::new(40, 0))), Some(Decimal::new(2000, 2)));
        assert_eq!(commission_amount(price, Some(Decimal::new(125, 1))), Some(Decimal::new(625, 2)));
        assert_eq!(commission_amount(price, None), None);
    }

    #[test]
    fn test_commission_rounds_to_cents() {
        let price = Decimal::new(3333, 2);
        assert_eq!(commission_amount(price, Some(Decimal::new(333, 1))), Some(Decimal::new(1110, 2)));
    }

    #[test]
    fn test_terminal_appointments_accept_notes_only() {
        let notes = UpdateAppointment {
            notes: Some("client paid cash".to_string()),
            ..Default::default()
        };
        let reschedule = UpdateAppointment {
            appointment_time: Some("11:00".to_string()),
            ..Default::default()
        };

        assert!(check_editable(Completed, &notes).is_ok());
        assert!(check_editable(Canceled, &notes).is_ok());
        assert!(check_editable(Completed, &reschedule).is_err());
        assert!(check_editable(Canceled, &reschedule).is_err());
        assert!(check_editable(Scheduled, &reschedule).is_ok());
        assert!(check_editable(Confirmed, &reschedule).is_ok());
    }
}
