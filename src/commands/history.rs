use anyhow::Result;
use rostersync_core::constants::DEFAULT_HISTORY_CAP;
use rostersync_core::{HistoryEntry, RunHistory, SyncConfig};

use crate::render::Render;

pub fn run(limit: Option<usize>, json: bool) -> Result<()> {
    let history = match SyncConfig::load() {
        Ok(config) => config.history()?,
        Err(e) => {
            tracing::debug!(error = %e, "No usable config; reading history from the default location");
            RunHistory::new(RunHistory::default_path()?, DEFAULT_HISTORY_CAP)
        }
    };

    let entries = history.load();
    let shown = most_recent(&entries, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("No sync runs recorded yet.");
        return Ok(());
    }

    for entry in shown {
        println!("{}", entry.render());
    }

    Ok(())
}

/// The last `limit` entries, still oldest first.
fn most_recent(entries: &[HistoryEntry], limit: Option<usize>) -> &[HistoryEntry] {
    match limit {
        Some(n) if n < entries.len() => &entries[entries.len() - n..],
        _ => entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            time: format!("2025-03-0{n} 09:00:00"),
            created: n,
            updated: 0,
            errors: 0,
            note: "ok".into(),
        }
    }

    #[test]
    fn test_most_recent_keeps_order() {
        let entries: Vec<_> = (1..=5).map(entry).collect();
        let shown = most_recent(&entries, Some(2));
        assert_eq!(shown, &[entry(4), entry(5)]);
    }

    #[test]
    fn test_most_recent_without_limit_or_with_large_limit() {
        let entries: Vec<_> = (1..=3).map(entry).collect();
        assert_eq!(most_recent(&entries, None).len(), 3);
        assert_eq!(most_recent(&entries, Some(10)).len(), 3);
        assert!(most_recent(&entries, Some(0)).is_empty());
    }
}
