//! Mapping between rostersync events and Google Calendar events.

use anyhow::{Result, bail};
use chrono::Utc;
use chrono_tz::Tz;
use google_calendar::types::{Event as GoogleEvent, EventDateTime};
use rostersync_core::{EventPayload, RemoteEvent, ZonedTime};

pub trait ToGoogle {
    fn to_google(&self) -> GoogleEvent;
}

impl ToGoogle for EventPayload {
    fn to_google(&self) -> GoogleEvent {
        GoogleEvent {
            summary: self.summary.clone(),
            description: self.description.clone(),
            start: Some(time_to_google(&self.start)),
            end: Some(time_to_google(&self.end)),
            ..Default::default()
        }
    }
}

fn time_to_google(time: &ZonedTime) -> EventDateTime {
    EventDateTime {
        date: None,
        date_time: Some(time.instant.with_timezone(&Utc)),
        time_zone: time
            .tzid
            .as_deref()
            .filter(|tzid| tzid.parse::<Tz>().is_ok())
            .unwrap_or_default()
            .to_string(),
    }
}

pub trait FromGoogle: Sized {
    /// `Ok(None)` for events a roster can never match (all-day entries).
    fn from_google(event: GoogleEvent) -> Result<Option<Self>>;
}

impl FromGoogle for RemoteEvent {
    fn from_google(event: GoogleEvent) -> Result<Option<Self>> {
        let (Some(start), Some(end)) = (event.start.as_ref(), event.end.as_ref()) else {
            bail!("Event {} has no start or end time", event.id);
        };

        let (Some(start), Some(end)) = (time_from_google(start), time_from_google(end)) else {
            return Ok(None);
        };

        Ok(Some(RemoteEvent {
            id: event.id,
            summary: event.summary,
            start,
            end,
        }))
    }
}

/// Timed values only. Presented in the event's own zone when Google
/// names one we know, UTC otherwise.
fn time_from_google(time: &EventDateTime) -> Option<ZonedTime> {
    let instant = time.date_time?;

    match time.time_zone.parse::<Tz>() {
        Ok(tz) => Some(ZonedTime::new(
            instant.with_timezone(&tz).fixed_offset(),
            Some(tz.name().to_string()),
        )),
        Err(_) => Some(ZonedTime::utc(instant)),
    }
}
