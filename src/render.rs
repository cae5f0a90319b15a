//! Colored terminal rendering for rostersync-core types.

use owo_colors::OwoColorize;
use rostersync_core::{EventOutcome, HistoryEntry, Outcome, RunStats};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Outcome {
    fn render(&self) -> String {
        match self {
            Outcome::Created { .. } => "+".green().to_string(),
            Outcome::Updated { .. } => "~".yellow().to_string(),
            Outcome::Failed { .. } => "!".red().to_string(),
        }
    }
}

impl Render for EventOutcome {
    fn render(&self) -> String {
        let time = format!("{} → {}", self.start, self.end);
        let line = match &self.outcome {
            Outcome::Created { .. } => {
                format!("{} {} {}", self.outcome.render(), self.summary.green(), time.dimmed())
            }
            Outcome::Updated { .. } => {
                format!("{} {} {}", self.outcome.render(), self.summary.yellow(), time.dimmed())
            }
            Outcome::Failed { reason } => format!(
                "{} {} {}\n      {}",
                self.outcome.render(),
                self.summary.red(),
                time.dimmed(),
                reason.red()
            ),
        };
        format!("   {line}")
    }
}

impl Render for RunStats {
    fn render(&self) -> String {
        let errors = format!("{} {}", self.errors, pluralize("error", self.errors));
        format!(
            "{} created, {} updated, {}",
            self.created,
            self.updated,
            if self.errors > 0 {
                errors.red().to_string()
            } else {
                errors
            }
        )
    }
}

impl Render for HistoryEntry {
    fn render(&self) -> String {
        let note = if self.errors > 0 {
            self.note.red().to_string()
        } else {
            self.note.dimmed().to_string()
        };
        format!(
            "{}  {:>3} created  {:>3} updated  {:>3} errors  {}",
            self.time, self.created, self.updated, self.errors, note
        )
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
