//! Candidate window for matching one roster event.

use chrono::{DateTime, Duration, FixedOffset};

use crate::event::{EventPayload, ZonedTime};

/// Time range in which remote candidates for one roster event may start.
/// Recomputed for every event, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<FixedOffset>,
    pub to: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// `[start - tolerance, end + tolerance]` of the event.
    pub fn around(payload: &EventPayload, tolerance: Duration) -> Self {
        TimeWindow {
            from: payload.start.instant - tolerance,
            to: payload.end.instant + tolerance,
        }
    }

    pub fn contains(&self, time: &ZonedTime) -> bool {
        self.from <= time.instant && time.instant <= self.to
    }

    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn payload() -> EventPayload {
        let offset = FixedOffset::east_opt(11 * 3600).unwrap();
        EventPayload {
            summary: "Shift A".into(),
            start: ZonedTime::new(offset.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(), None),
            end: ZonedTime::new(offset.with_ymd_and_hms(2025, 3, 1, 17, 0, 0).unwrap(), None),
            description: String::new(),
        }
    }

    #[test]
    fn test_window_pads_both_ends() {
        let window = TimeWindow::around(&payload(), Duration::hours(5));
        assert_eq!(window.from_rfc3339(), "2025-03-01T04:00:00+11:00");
        assert_eq!(window.to_rfc3339(), "2025-03-01T22:00:00+11:00");
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = TimeWindow::around(&payload(), Duration::hours(5));
        assert!(window.contains(&ZonedTime::new(window.from, None)));
        assert!(window.contains(&ZonedTime::new(window.to, None)));
        assert!(!window.contains(&ZonedTime::new(window.to + Duration::seconds(1), None)));
    }
}
