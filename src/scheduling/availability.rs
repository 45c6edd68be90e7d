//! Working-hours template and free-slot derivation

use chrono::{Duration, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use super::{Booking, TimeRange};

/// Daily working-hours template: `[open, close)` cut into fixed slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    open: NaiveTime,
    close: NaiveTime,
    slot_minutes: u32,
}

impl WorkingHours {
    pub fn new(open: NaiveTime, close: NaiveTime, slot_minutes: u32) -> Result<Self, String> {
        if open >= close {
            return Err(format!(
                "Opening time {} must be before closing time {}",
                open.format("%H:%M"),
                close.format("%H:%M")
            ));
        }
        if slot_minutes == 0 || slot_minutes > 24 * 60 {
            return Err(format!("Invalid slot granularity: {} minutes", slot_minutes));
        }
        Ok(Self { open, close, slot_minutes })
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    /// Every template slot of the day, booked or not
    #[cfg(test)]
    fn slots(&self) -> AvailableSlots {
        AvailableSlots::new(self, Vec::new(), None)
    }
}

/// A bookable interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimeSlot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Lazy, chronologically ordered iterator over the free slots of one day.
///
/// A slot is dropped when its start falls inside a booked range. When a
/// required duration is given, the slot is also dropped unless a booking of
/// that length starting there fits before closing time without overlapping
/// anything already booked.
#[derive(Debug, Clone)]
pub struct AvailableSlots {
    next: Option<NaiveTime>,
    close: NaiveTime,
    step: Duration,
    booked: Vec<TimeRange>,
    required_minutes: Option<i32>,
}

impl AvailableSlots {
    pub fn new(hours: &WorkingHours, bookings: Vec<Booking>, required_minutes: Option<i32>) -> Self {
        Self {
            next: Some(hours.open),
            close: hours.close,
            step: Duration::minutes(hours.slot_minutes as i64),
            booked: bookings.iter().map(Booking::range).collect(),
            required_minutes,
        }
    }

    fn is_free(&self, start: NaiveTime) -> bool {
        if self.booked.iter().any(|r| r.contains(start)) {
            return false;
        }

        match self.required_minutes {
            None => true,
            Some(minutes) => match TimeRange::from_duration(start, minutes) {
                Ok(wanted) => {
                    wanted.end() <= self.close && !self.booked.iter().any(|r| r.overlaps(&wanted))
                }
                Err(_) => false,
            },
        }
    }
}

impl Iterator for AvailableSlots {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<TimeSlot> {
        loop {
            let start = self.next?;
            if start >= self.close {
                self.next = None;
                return None;
            }

            let (after, overflow) = start.overflowing_add_signed(self.step);
            let end = if overflow == 0 && after < self.close { after } else { self.close };
            self.next = if overflow == 0 { Some(after) } else { None };

            if self.is_free(start) {
                return Some(TimeSlot { start_time: start, end_time: end });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn hours() -> WorkingHours {
        WorkingHours::new(t(8, 0), t(18, 0), 30).unwrap()
    }

    fn booking(id: i32, start: NaiveTime, minutes: i32) -> Booking {
        Booking {
            appointment_id: id,
            appointment_time: start,
            duration_minutes: minutes,
        }
    }

    #[test]
    fn test_template_covers_working_day() {
        let slots: Vec<_> = hours().slots().collect();
        assert_eq!(slots.len(), 20);
        assert_eq!(slots[0], TimeSlot { start_time: t(8, 0), end_time: t(8, 30) });
        assert_eq!(slots[19], TimeSlot { start_time: t(17, 30), end_time: t(18, 0) });
    }

    #[test]
    fn test_partial_last_slot_ends_at_close() {
        let h = WorkingHours::new(t(9, 0), t(10, 15), 30).unwrap();
        let slots: Vec<_> = h.slots().collect();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[2], TimeSlot { start_time: t(10, 0), end_time: t(10, 15) });
    }

    #[test]
    fn test_booked_slot_is_removed() {
        let slots: Vec<_> = AvailableSlots::new(&hours(), vec![booking(1, t(9, 0), 30)], None).collect();
        assert!(!slots.iter().any(|s| s.start_time == t(9, 0)));
        assert!(slots.iter().any(|s| s.start_time == t(8, 30)));
        assert!(slots.iter().any(|s| s.start_time == t(9, 30)));
        assert_eq!(slots.len(), 19);
    }

    #[test]
    fn test_long_booking_removes_every_covered_start() {
        let slots: Vec<_> = AvailableSlots::new(&hours(), vec![booking(1, t(9, 0), 60)], None)
            .map(|s| s.start_time)
            .collect();
        assert!(!slots.contains(&t(9, 0)));
        assert!(!slots.contains(&t(9, 30)));
        assert!(slots.contains(&t(10, 0)));
    }

    #[test]
    fn test_off_grid_booking_blocks_slot_it_covers() {
        // 09:15-09:45 covers the 09:30 start but not 09:00
        let slots: Vec<_> = AvailableSlots::new(&hours(), vec![booking(1, t(9, 15), 30)], None)
            .map(|s| s.start_time)
            .collect();
        assert!(slots.contains(&t(9, 0)));
        assert!(!slots.contains(&t(9, 30)));
    }

    #[test]
    fn test_required_duration_must_fit() {
        // 60 minutes needed, 10:00 is booked: 09:30 no longer fits
        let slots: Vec<_> = AvailableSlots::new(&hours(), vec![booking(1, t(10, 0), 30)], Some(60))
            .map(|s| s.start_time)
            .collect();
        assert!(slots.contains(&t(9, 0)));
        assert!(!slots.contains(&t(9, 30)));
        assert!(!slots.contains(&t(10, 0)));
        assert!(slots.contains(&t(10, 30)));
        // must also end by closing time
        assert!(slots.contains(&t(17, 0)));
        assert!(!slots.contains(&t(17, 30)));
    }

    #[test]
    fn test_fully_booked_day_is_empty() {
        let slots: Vec<_> = AvailableSlots::new(&hours(), vec![booking(1, t(8, 0), 600)], None).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_slots_are_chronological() {
        let bookings = vec![booking(2, t(15, 0), 30), booking(1, t(9, 0), 30)];
        let starts: Vec<_> = AvailableSlots::new(&hours(), bookings, None)
            .map(|s| s.start_time)
            .collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_invalid_templates() {
        assert!(WorkingHours::new(t(18, 0), t(8, 0), 30).is_err());
        assert!(WorkingHours::new(t(8, 0), t(8, 0), 30).is_err());
        assert!(WorkingHours::new(t(8, 0), t(18, 0), 0).is_err());
    }
}
