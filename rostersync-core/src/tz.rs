//! Attaching a civil timezone to roster times.

use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::error::{RosterSyncError, RosterSyncResult};
use crate::event::{EventTime, ZonedTime};

/// Resolves floating roster times to the configured zone.
///
/// Floating times are *localized*, not converted: `09:00` floating becomes
/// `09:00` in the configured zone. Times that already carry a zone pass
/// through untouched.
#[derive(Debug, Clone, Copy)]
pub struct TimeNormalizer {
    tz: Tz,
}

impl TimeNormalizer {
    pub fn new(tzid: &str) -> RosterSyncResult<Self> {
        let tz: Tz = tzid
            .parse()
            .map_err(|_| RosterSyncError::InvalidTimezone(tzid.to_string()))?;
        Ok(TimeNormalizer { tz })
    }

    pub fn tzid(&self) -> &'static str {
        self.tz.name()
    }

    pub fn normalize(&self, time: &EventTime) -> ZonedTime {
        match time {
            EventTime::Zoned(zoned) => zoned.clone(),
            EventTime::Floating(naive) => ZonedTime {
                instant: localize(self.tz, naive),
                tzid: Some(self.tz.name().to_string()),
            },
        }
    }
}

/// Read a wall-clock time in `tz`, resolving DST transitions the same way
/// wherever a zone gets attached.
pub fn localize(tz: Tz, naive: &NaiveDateTime) -> DateTime<FixedOffset> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => dt.fixed_offset(),
        // Wall clock repeated when DST ends: read it as standard time.
        LocalResult::Ambiguous(_, standard) => standard.fixed_offset(),
        // Wall clock skipped when DST starts: keep the offset in force before the jump.
        LocalResult::None => {
            let offset = tz.offset_from_utc_datetime(&(*naive - Duration::days(1))).fix();
            let utc = *naive - Duration::seconds(i64::from(offset.local_minus_utc()));
            DateTime::from_naive_utc_and_offset(utc, offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_floating_time_is_localized_not_converted() {
        let normalizer = TimeNormalizer::new("Australia/Melbourne").unwrap();
        let zoned = normalizer.normalize(&EventTime::Floating(naive(2025, 3, 1, 9, 0)));

        assert_eq!(zoned.instant.to_rfc3339(), "2025-03-01T09:00:00+11:00");
        assert_eq!(zoned.tzid.as_deref(), Some("Australia/Melbourne"));
    }

    #[test]
    fn test_zoned_time_is_returned_unchanged() {
        let normalizer = TimeNormalizer::new("Australia/Melbourne").unwrap();
        let original = ZonedTime::utc(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());

        let once = normalizer.normalize(&EventTime::Zoned(original.clone()));
        let twice = normalizer.normalize(&EventTime::Zoned(once.clone()));

        assert_eq!(once, original);
        assert_eq!(twice, original);
    }

    #[test]
    fn test_unknown_zone_is_a_config_fault() {
        let err = TimeNormalizer::new("Mars/Olympus_Mons").unwrap_err();
        assert!(matches!(err, RosterSyncError::InvalidTimezone(_)));
        assert!(err.is_config_fault());
    }

    #[test]
    fn test_repeated_hour_resolves_to_standard_time() {
        // Melbourne leaves DST at 03:00 on 2025-04-06, repeating 02:00-03:00.
        let normalizer = TimeNormalizer::new("Australia/Melbourne").unwrap();
        let zoned = normalizer.normalize(&EventTime::Floating(naive(2025, 4, 6, 2, 30)));
        assert_eq!(zoned.instant.to_rfc3339(), "2025-04-06T02:30:00+10:00");
    }

    #[test]
    fn test_skipped_hour_uses_offset_before_the_jump() {
        // Melbourne enters DST at 02:00 on 2025-10-05; 02:30 never happens.
        let normalizer = TimeNormalizer::new("Australia/Melbourne").unwrap();
        let zoned = normalizer.normalize(&EventTime::Floating(naive(2025, 10, 5, 2, 30)));
        assert_eq!(zoned.instant.to_rfc3339(), "2025-10-05T02:30:00+10:00");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let normalizer = TimeNormalizer::new("Europe/Berlin").unwrap();
        let time = EventTime::Floating(naive(2025, 7, 14, 22, 15));
        assert_eq!(normalizer.normalize(&time), normalizer.normalize(&time));
    }

    #[test]
    fn test_localize_handles_gap_in_any_zone() {
        // Berlin skips 02:00-03:00 on 2025-03-30.
        let berlin: Tz = "Europe/Berlin".parse().unwrap();
        let dt = localize(berlin, &naive(2025, 3, 30, 2, 30));
        assert_eq!(dt.to_rfc3339(), "2025-03-30T02:30:00+01:00");
    }
}
