//! Roster export parsing using the icalendar crate's parser.
//!
//! Each VEVENT becomes one [`SourceEvent`]. Times keep whatever zone the
//! export gave them; floating times stay floating for the
//! [`TimeNormalizer`](crate::tz::TimeNormalizer) to resolve.

use std::path::Path;

use chrono_tz::Tz;
use icalendar::parser::{Component, read_calendar, unfold};
use icalendar::{CalendarDateTime, DatePerhapsTime};

use crate::error::{RosterSyncError, RosterSyncResult};
use crate::event::{EventTime, SourceEvent, ZonedTime};
use crate::tz::localize;

/// Parse every timed VEVENT in an ICS document.
///
/// All-day entries and entries that don't end after they start are
/// skipped with a warning; a shift is always a time-bounded event.
pub fn parse_roster(content: &str) -> RosterSyncResult<Vec<SourceEvent>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(RosterSyncError::IcsParse)?;

    let mut vevents = Vec::new();
    collect_vevents(&calendar.components, &mut vevents);

    Ok(vevents.into_iter().filter_map(parse_vevent).collect())
}

/// Read and parse one roster export file.
pub fn parse_roster_file(path: &Path) -> RosterSyncResult<Vec<SourceEvent>> {
    let content = std::fs::read_to_string(path)?;
    let events = parse_roster(&content)
        .map_err(|e| RosterSyncError::IcsParse(format!("{}: {}", path.display(), e)))?;

    tracing::info!(file = %path.display(), count = events.len(), "Parsed roster export");
    Ok(events)
}

fn collect_vevents<'a, 'b>(components: &'b [Component<'a>], out: &mut Vec<&'b Component<'a>>) {
    for component in components {
        if component.name == "VEVENT" {
            out.push(component);
        } else {
            collect_vevents(&component.components, out);
        }
    }
}

fn parse_vevent(vevent: &Component<'_>) -> Option<SourceEvent> {
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_text(&p.val.to_string()))
        .unwrap_or_else(|| "(No title)".to_string());

    let Some(start) = vevent.find_prop("DTSTART").and_then(|p| DatePerhapsTime::try_from(p).ok())
    else {
        tracing::warn!(%summary, "Skipping roster entry without a usable DTSTART");
        return None;
    };
    let Some(end) = vevent.find_prop("DTEND").and_then(|p| DatePerhapsTime::try_from(p).ok())
    else {
        tracing::warn!(%summary, "Skipping roster entry without a usable DTEND");
        return None;
    };

    let (Some(start), Some(end)) = (to_event_time(start), to_event_time(end)) else {
        tracing::warn!(%summary, "Skipping all-day roster entry");
        return None;
    };

    if !ends_after_start(&start, &end) {
        tracing::warn!(%summary, "Skipping roster entry that doesn't end after it starts");
        return None;
    }

    let external_id = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string().trim().to_string())
        .unwrap_or_default();
    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| unescape_text(&p.val.to_string()).trim().to_string())
        .unwrap_or_default();

    Some(
        SourceEvent::new(summary, start, end)
            .with_external_id(external_id)
            .with_description(description),
    )
}

/// Convert icalendar's DatePerhapsTime to an EventTime. Dates yield None.
fn to_event_time(dpt: DatePerhapsTime) -> Option<EventTime> {
    match dpt {
        DatePerhapsTime::Date(_) => None,
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => {
            Some(EventTime::Zoned(ZonedTime::utc(dt)))
        }
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            Some(EventTime::Floating(naive))
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            match tzid.parse::<Tz>() {
                Ok(tz) => Some(EventTime::Zoned(ZonedTime::new(
                    localize(tz, &date_time),
                    Some(tzid),
                ))),
                Err(_) => {
                    tracing::warn!(%tzid, "Unrecognised TZID; treating time as floating");
                    Some(EventTime::Floating(date_time))
                }
            }
        }
    }
}

/// Only comparable when both ends carry a zone; floating pairs are
/// compared as wall-clock times.
fn ends_after_start(start: &EventTime, end: &EventTime) -> bool {
    match (start, end) {
        (EventTime::Zoned(s), EventTime::Zoned(e)) => e.instant > s.instant,
        (EventTime::Floating(s), EventTime::Floating(e)) => e > s,
        _ => true,
    }
}

/// Undo RFC 5545 TEXT escaping (`\,` `\;` `\n` `\\`).
fn unescape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
