//! Half-open time-of-day ranges

use chrono::{Duration, NaiveTime};

/// A `[start, end)` range within a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    /// Build a range from a start time and a length in minutes.
    ///
    /// Fails when the length is not positive or when the range would run past
    /// midnight; a booking ending exactly at 24:00 is rejected as well.
    pub fn from_duration(start: NaiveTime, minutes: i32) -> Result<Self, String> {
        if minutes <= 0 {
            return Err(format!("Duration must be positive (got {} minutes)", minutes));
        }

        let (end, overflow) = start.overflowing_add_signed(Duration::minutes(minutes as i64));
        if overflow != 0 {
            return Err(format!(
                "A {} minute booking starting at {} runs past midnight",
                minutes,
                start.format("%H:%M")
            ));
        }

        Ok(Self { start, end })
    }

    /// Build a range for a row already in storage, clamping at end of day
    /// instead of failing.
    pub fn saturating(start: NaiveTime, minutes: i32) -> Self {
        let minutes = minutes.max(0) as i64;
        let (end, overflow) = start.overflowing_add_signed(Duration::minutes(minutes));
        let end = if overflow != 0 { end_of_day() } else { end };
        Self { start, end }
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Half-open overlap: touching ranges do not overlap
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t < self.end
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_overlap() {
        let a = TimeRange::from_duration(t(9, 0), 60).unwrap();
        let b = TimeRange::from_duration(t(9, 30), 30).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_abutting_ranges_do_not_overlap() {
        let a = TimeRange::from_duration(t(9, 0), 60).unwrap();
        let c = TimeRange::from_duration(t(10, 0), 30).unwrap();
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn test_enclosing_range_overlaps() {
        let outer = TimeRange::from_duration(t(8, 0), 240).unwrap();
        let inner = TimeRange::from_duration(t(9, 0), 15).unwrap();
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = TimeRange::from_duration(t(9, 0), 30).unwrap();
        assert!(r.contains(t(9, 0)));
        assert!(r.contains(t(9, 29)));
        assert!(!r.contains(t(9, 30)));
    }

    #[test]
    fn test_rejects_midnight_crossing() {
        assert!(TimeRange::from_duration(t(23, 30), 45).is_err());
        assert!(TimeRange::from_duration(t(23, 30), 30).is_err());
        assert!(TimeRange::from_duration(t(23, 0), 30).is_ok());
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        assert!(TimeRange::from_duration(t(9, 0), 0).is_err());
        assert!(TimeRange::from_duration(t(9, 0), -15).is_err());
    }

    #[test]
    fn test_saturating_clamps() {
        let r = TimeRange::saturating(t(23, 30), 90);
        assert_eq!(r.start(), t(23, 30));
        assert!(r.contains(t(23, 59)));
    }

    #[test]
    fn test_display() {
        let r = TimeRange::from_duration(t(9, 0), 90).unwrap();
        assert_eq!(r.to_string(), "09:00-10:30");
    }
}
