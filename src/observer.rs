//! Terminal progress for a sync run.

use indicatif::ProgressBar;
use rostersync_core::{SyncObserver, SyncProgress};

use crate::render::Render;
use crate::utils::tui;

/// Shows a spinner for the event in flight and prints each outcome as it
/// lands. Also forwards everything to the log.
pub struct ConsoleObserver {
    spinner: ProgressBar,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        ConsoleObserver {
            spinner: tui::create_spinner("Syncing".to_string()),
        }
    }
}

impl SyncObserver for ConsoleObserver {
    fn notify(&self, progress: SyncProgress) {
        match &progress {
            SyncProgress::RunStarted { calendar_id, total } => {
                self.spinner
                    .println(format!("📅 {calendar_id} ({total} roster events)"));
            }
            SyncProgress::EventStarted { index, total, summary } => {
                self.spinner
                    .set_message(format!("[{}/{}] {}", index + 1, total, summary));
            }
            SyncProgress::EventFinished { outcome, .. } => {
                self.spinner.println(outcome.render());
            }
            SyncProgress::RunFinished { .. } => {
                self.spinner.finish_and_clear();
            }
        }

        rostersync_core::TracingObserver.notify(progress);
    }
}

impl Drop for ConsoleObserver {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
