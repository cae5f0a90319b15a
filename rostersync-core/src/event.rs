//! Provider-neutral event types.
//!
//! Roster entries come in as [`SourceEvent`]s, whose times may or may not
//! carry a zone. The reconciler turns each one into an [`EventPayload`]
//! with fully zoned times and compares it against [`RemoteEvent`]s owned
//! by the remote store.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An instant together with the zone it should be presented in.
///
/// Equality compares both the offset-carrying instant and the zone name;
/// use [`ZonedTime::seconds_from`] for instant-only comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonedTime {
    pub instant: DateTime<FixedOffset>,
    /// IANA zone name, when known. Offset-only times leave this empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tzid: Option<String>,
}

impl ZonedTime {
    pub fn new(instant: DateTime<FixedOffset>, tzid: Option<String>) -> Self {
        ZonedTime { instant, tzid }
    }

    pub fn utc(instant: DateTime<Utc>) -> Self {
        ZonedTime {
            instant: instant.fixed_offset(),
            tzid: Some("UTC".to_string()),
        }
    }

    /// Signed number of seconds from `other` to `self`.
    pub fn seconds_from(&self, other: &ZonedTime) -> i64 {
        (self.instant - other.instant).num_seconds()
    }
}

impl fmt::Display for ZonedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instant.format("%Y-%m-%d %H:%M %:z"))
    }
}

/// A roster time as the parser found it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    /// Wall-clock time with no zone; resolved against the configured zone.
    Floating(NaiveDateTime),
    /// Time that already carries zone information.
    Zoned(ZonedTime),
}

impl From<ZonedTime> for EventTime {
    fn from(time: ZonedTime) -> Self {
        EventTime::Zoned(time)
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(time: NaiveDateTime) -> Self {
        EventTime::Floating(time)
    }
}

/// One roster line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEvent {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    /// Source-system key (UID). Carried along but not used for matching.
    pub external_id: String,
    pub description: String,
}

impl SourceEvent {
    pub fn new(summary: impl Into<String>, start: impl Into<EventTime>, end: impl Into<EventTime>) -> Self {
        SourceEvent {
            summary: summary.into(),
            start: start.into(),
            end: end.into(),
            external_id: String::new(),
            description: String::new(),
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = external_id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An event as stored by the remote calendar. The id is opaque and owned
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub id: String,
    pub summary: String,
    pub start: ZonedTime,
    pub end: ZonedTime,
}

/// The body sent to the remote store on insert and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub summary: String,
    pub start: ZonedTime,
    pub end: ZonedTime,
    pub description: String,
}

impl fmt::Display for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} → {})", self.summary, self.start, self.end)
    }
}
