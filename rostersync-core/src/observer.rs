//! Progress reporting for a reconcile run.
//!
//! The reconciler never prints. It pushes [`SyncProgress`] values into an
//! injected [`SyncObserver`]; frontends decide how to show them.

use tokio::sync::mpsc::UnboundedSender;

use crate::outcome::{EventOutcome, Outcome, RunStats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncProgress {
    RunStarted { calendar_id: String, total: usize },
    EventStarted { index: usize, total: usize, summary: String },
    EventFinished { index: usize, outcome: EventOutcome },
    RunFinished { stats: RunStats },
}

pub trait SyncObserver: Send + Sync {
    fn notify(&self, progress: SyncProgress);
}

/// Discards every progress event.
pub struct NoopObserver;

impl SyncObserver for NoopObserver {
    fn notify(&self, _progress: SyncProgress) {}
}

/// Writes progress to the `tracing` subscriber.
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn notify(&self, progress: SyncProgress) {
        match progress {
            SyncProgress::RunStarted { calendar_id, total } => {
                tracing::info!(%calendar_id, total, "Starting sync");
            }
            SyncProgress::EventStarted { index, total, summary } => {
                tracing::debug!(index, total, %summary, "Reconciling event");
            }
            SyncProgress::EventFinished { outcome, .. } => match &outcome.outcome {
                Outcome::Created { remote_id } => {
                    tracing::info!(summary = %outcome.summary, start = %outcome.start, %remote_id, "Created");
                }
                Outcome::Updated { remote_id } => {
                    tracing::info!(summary = %outcome.summary, start = %outcome.start, %remote_id, "Updated");
                }
                Outcome::Failed { reason } => {
                    tracing::warn!(summary = %outcome.summary, start = %outcome.start, %reason, "Failed");
                }
            },
            SyncProgress::RunFinished { stats } => {
                tracing::info!(
                    created = stats.created,
                    updated = stats.updated,
                    errors = stats.errors,
                    "Sync complete"
                );
            }
        }
    }
}

/// Lets a frontend receive progress on another task.
impl SyncObserver for UnboundedSender<SyncProgress> {
    fn notify(&self, progress: SyncProgress) {
        // A dropped receiver just means nobody is watching anymore.
        let _ = self.send(progress);
    }
}
