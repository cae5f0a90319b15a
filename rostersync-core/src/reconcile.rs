//! The reconcile pass: make the remote calendar reflect a roster.
//!
//! Events are handled strictly one after another. Each one gets its own
//! window query, match, and insert-or-update round trip, and any failure
//! in that round trip becomes the event's outcome instead of ending the
//! run.

use crate::config::SyncConfig;
use crate::error::{RosterSyncError, RosterSyncResult};
use crate::event::{EventPayload, SourceEvent};
use crate::lock::RunLock;
use crate::matcher::Matcher;
use crate::observer::{SyncObserver, SyncProgress};
use crate::outcome::{EventOutcome, Outcome, RunReport};
use crate::remote::RemoteStore;
use crate::tz::TimeNormalizer;
use crate::window::TimeWindow;

pub struct Reconciler<'a, S: RemoteStore + ?Sized> {
    calendar_id: String,
    store: &'a S,
    normalizer: TimeNormalizer,
    matcher: Matcher,
    max_candidates: usize,
}

impl<'a, S: RemoteStore + ?Sized> Reconciler<'a, S> {
    /// Build a reconciler for the configured calendar.
    ///
    /// Fails with a configuration fault if any option is out of range.
    pub fn new(config: &SyncConfig, store: &'a S) -> RosterSyncResult<Self> {
        config.validate()?;

        Ok(Reconciler {
            calendar_id: config.calendar_id.clone(),
            store,
            normalizer: TimeNormalizer::new(&config.timezone)?,
            matcher: Matcher::new(config.match_tolerance_seconds),
            max_candidates: config.max_candidates_per_window,
        })
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Zone-resolved payload for a roster event.
    pub fn payload_for(&self, event: &SourceEvent) -> EventPayload {
        EventPayload {
            summary: event.summary.clone(),
            start: self.normalizer.normalize(&event.start),
            end: self.normalizer.normalize(&event.end),
            description: event.description.clone(),
        }
    }

    /// Reconcile `events` in order. The returned report has exactly one
    /// outcome per event.
    ///
    /// Only errors that prevent the run from starting are returned as
    /// `Err`; per-event failures land in the report.
    pub async fn reconcile(
        &self,
        events: &[SourceEvent],
        lock: &RunLock,
        observer: &dyn SyncObserver,
    ) -> RosterSyncResult<RunReport> {
        if lock.calendar_id() != self.calendar_id {
            return Err(RosterSyncError::Config(format!(
                "Run lock is held for calendar '{}', not '{}'",
                lock.calendar_id(),
                self.calendar_id
            )));
        }

        let total = events.len();
        observer.notify(SyncProgress::RunStarted {
            calendar_id: self.calendar_id.clone(),
            total,
        });

        let mut report = RunReport::default();

        for (index, event) in events.iter().enumerate() {
            observer.notify(SyncProgress::EventStarted {
                index,
                total,
                summary: event.summary.clone(),
            });

            let payload = self.payload_for(event);
            let outcome = match self.reconcile_one(&payload).await {
                Ok(outcome) => outcome,
                Err(e) => Outcome::Failed {
                    reason: e.to_string(),
                },
            };

            let event_outcome = EventOutcome {
                summary: payload.summary,
                start: payload.start,
                end: payload.end,
                outcome,
            };
            report.push(event_outcome.clone());

            observer.notify(SyncProgress::EventFinished {
                index,
                outcome: event_outcome,
            });
        }

        observer.notify(SyncProgress::RunFinished {
            stats: report.stats,
        });

        Ok(report)
    }

    async fn reconcile_one(&self, payload: &EventPayload) -> RosterSyncResult<Outcome> {
        let window = TimeWindow::around(payload, self.matcher.tolerance());
        let candidates = self
            .store
            .list_in_window(&self.calendar_id, &window, self.max_candidates)
            .await?;

        match self.matcher.find_match(payload, &candidates) {
            Some(existing) => {
                self.store
                    .update(&self.calendar_id, &existing.id, payload)
                    .await?;
                Ok(Outcome::Updated {
                    remote_id: existing.id.clone(),
                })
            }
            None => {
                let created = self.store.insert(&self.calendar_id, payload).await?;
                Ok(Outcome::Created {
                    remote_id: created.id,
                })
            }
        }
    }
}
