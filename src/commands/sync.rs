use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rostersync_core::ics::parse_roster_file;
use rostersync_core::{Reconciler, RunHistory, RunLock, RunReport, RunStats, SourceEvent, SyncConfig};

use crate::observer::ConsoleObserver;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(files: &[PathBuf]) -> Result<()> {
    let config = SyncConfig::load()?;
    let history = config.history()?;

    match sync(&config, files).await {
        Ok(report) => {
            println!("\n{}", report.stats.render());
            record(&history, &report.stats, report.stats.note());
            Ok(())
        }
        Err(e) => {
            let failed = RunStats {
                errors: 1,
                ..RunStats::default()
            };
            record(&history, &failed, &format!("exception: {e}"));
            Err(e)
        }
    }
}

/// Everything up to and including the reconcile pass. Errors returned
/// here mean the run never got going.
async fn sync(config: &SyncConfig, files: &[PathBuf]) -> Result<RunReport> {
    let remote = config.remote()?;

    let spinner = tui::create_spinner(format!("Checking {} account", remote.provider.name()));
    let verified = remote.verify().await;
    spinner.finish_and_clear();
    let account = verified?;
    tracing::info!(%account, "Remote store verified");

    let lock = RunLock::acquire(&config.calendar_id)?;
    let events = load_roster(files)?;

    let reconciler = Reconciler::new(config, &remote)?;
    let observer = ConsoleObserver::new();
    let report = reconciler.reconcile(&events, &lock, &observer).await?;

    Ok(report)
}

/// Parse every export in order. A file that can't be read or parsed is
/// reported and skipped; the run only fails if none could be used.
fn load_roster(files: &[PathBuf]) -> Result<Vec<SourceEvent>> {
    let mut events = Vec::new();
    let mut loaded = 0;

    for file in files {
        match parse_roster_file(file) {
            Ok(parsed) => {
                loaded += 1;
                events.extend(parsed);
            }
            Err(e) => eprintln!("{} {}", "Skipping".red(), e),
        }
    }

    if loaded == 0 {
        anyhow::bail!("None of the roster files could be read");
    }

    Ok(events)
}

/// History is best effort: a write failure never fails a finished run.
fn record(history: &RunHistory, stats: &RunStats, note: &str) {
    if let Err(e) = history
        .record(stats, note)
        .with_context(|| format!("Could not update run history at {}", history.path().display()))
    {
        tracing::warn!("{e:#}");
    }
}
