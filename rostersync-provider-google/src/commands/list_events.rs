use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use google_calendar::types::OrderBy;
use rostersync_core::RemoteEvent;
use rostersync_core::remote::protocol::ListEvents;

use crate::google_event::FromGoogle;
use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

pub async fn handle(cmd: ListEvents) -> Result<Vec<RemoteEvent>> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let from = parse_bound(&cmd.from)?;
    let to = parse_bound(&cmd.to)?;

    let client = Session::load_valid(&config.google_account).await?.client()?;

    let response = client
        .events()
        .list_all(
            &cmd.calendar_id,
            "",
            0,
            OrderBy::StartTime,
            &[],
            "", // search query
            &[],
            false,
            false,
            true, // single events, so ordering by start time is allowed
            &cmd.to,
            &cmd.from,
            "",
            "",
        )
        .await
        .context("Failed to fetch events")?;

    let mut events = Vec::new();
    for google_event in response.body {
        if let Some(event) = RemoteEvent::from_google(google_event)? {
            events.push(event);
        }
    }

    Ok(starting_within(events, from, to, cmd.max_results))
}

fn parse_bound(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).with_context(|| format!("Invalid window bound: {raw}"))
}

/// Google matches on overlap; keep only events that start inside the
/// window, earliest first, at most `max_results`.
fn starting_within(
    mut events: Vec<RemoteEvent>,
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
    max_results: usize,
) -> Vec<RemoteEvent> {
    events.retain(|e| from <= e.start.instant && e.start.instant <= to);
    events.sort_by_key(|e| e.start.instant);
    events.truncate(max_results);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use rostersync_core::ZonedTime;

    fn event(id: &str, start: &str) -> RemoteEvent {
        let start = ZonedTime::new(DateTime::parse_from_rfc3339(start).unwrap(), None);
        RemoteEvent {
            id: id.into(),
            summary: "Shift".into(),
            start: start.clone(),
            end: start,
        }
    }

    #[test]
    fn test_starting_within_filters_sorts_and_caps() {
        let from = parse_bound("2025-03-01T04:00:00+11:00").unwrap();
        let to = parse_bound("2025-03-01T22:00:00+11:00").unwrap();
        let events = vec![
            event("late", "2025-03-01T20:00:00+11:00"),
            event("before", "2025-02-28T23:00:00+11:00"),
            event("early", "2025-03-01T04:00:00+11:00"),
            event("mid", "2025-03-01T09:00:00+11:00"),
        ];

        let kept: Vec<_> = starting_within(events.clone(), from, to, 10)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(kept, vec!["early", "mid", "late"]);

        assert_eq!(starting_within(events, from, to, 2).len(), 2);
    }

    #[test]
    fn test_parse_bound_rejects_garbage() {
        assert!(parse_bound("yesterday").is_err());
    }
}
