//! Per-event outcomes and run totals.

use serde::{Deserialize, Serialize};

use crate::event::ZonedTime;

/// What happened to one roster event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Created { remote_id: String },
    Updated { remote_id: String },
    Failed { reason: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub summary: String,
    pub start: ZonedTime,
    pub end: ZonedTime,
    pub outcome: Outcome,
}

/// Aggregate counts for one run. `created + updated + errors` always
/// equals the number of events processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub created: usize,
    pub updated: usize,
    pub errors: usize,
}

impl RunStats {
    pub fn total(&self) -> usize {
        self.created + self.updated + self.errors
    }

    pub fn tally(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Created { .. } => self.created += 1,
            Outcome::Updated { .. } => self.updated += 1,
            Outcome::Failed { .. } => self.errors += 1,
        }
    }

    /// Short note recorded alongside the counts in run history.
    pub fn note(&self) -> &'static str {
        if self.errors == 0 { "ok" } else { "with errors" }
    }
}

/// Everything a finished run produced, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcomes: Vec<EventOutcome>,
    pub stats: RunStats,
}

impl RunReport {
    pub fn push(&mut self, outcome: EventOutcome) {
        self.stats.tally(&outcome.outcome);
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &EventOutcome> {
        self.outcomes.iter().filter(|o| o.outcome.is_failure())
    }
}
