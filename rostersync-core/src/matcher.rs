//! Deciding whether a remote event already represents a roster shift.

use chrono::Duration;

use crate::event::{EventPayload, RemoteEvent};

/// Summary-plus-start-time matcher.
///
/// A candidate matches when its summary equals the roster summary exactly
/// and its start lies within `tolerance` of the roster start (inclusive).
/// The first match in ascending start order wins, even if a later one is
/// closer in time.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    tolerance: Duration,
}

impl Matcher {
    pub fn new(tolerance_seconds: i64) -> Self {
        Matcher {
            tolerance: Duration::seconds(tolerance_seconds),
        }
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    pub fn find_match<'a>(
        &self,
        source: &EventPayload,
        candidates: &'a [RemoteEvent],
    ) -> Option<&'a RemoteEvent> {
        // Stores are asked for ascending start order; sorting again (stably)
        // keeps first-match semantics for stores that don't honor it.
        let mut ordered: Vec<&RemoteEvent> = candidates.iter().collect();
        ordered.sort_by_key(|candidate| candidate.start.instant);

        ordered
            .into_iter()
            .find(|candidate| self.is_match(source, candidate))
    }

    fn is_match(&self, source: &EventPayload, candidate: &RemoteEvent) -> bool {
        let drift = (candidate.start.instant - source.start.instant).abs();
        drift <= self.tolerance && candidate.summary == source.summary
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::new(crate::constants::DEFAULT_MATCH_TOLERANCE_SECONDS)
    }
}
