//! Sync configuration.
//!
//! Loaded from `<config_dir>/rostersync/config.toml`, with any key
//! overridable through a `ROSTERSYNC_`-prefixed environment variable.
//! The resulting [`SyncConfig`] is passed explicitly to whatever needs it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HISTORY_CAP, DEFAULT_MATCH_TOLERANCE_SECONDS, DEFAULT_MAX_CANDIDATES,
    DEFAULT_PROVIDER_TIMEOUT_SECONDS, DEFAULT_TIMEZONE,
};
use crate::error::{RosterSyncError, RosterSyncResult};
use crate::history::RunHistory;
use crate::remote::Remote;
use crate::tz::TimeNormalizer;

/// Tolerances beyond a week stop meaning "the same shift".
const MAX_MATCH_TOLERANCE_SECONDS: i64 = 7 * 24 * 60 * 60;

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_match_tolerance() -> i64 {
    DEFAULT_MATCH_TOLERANCE_SECONDS
}

fn default_max_candidates() -> usize {
    DEFAULT_MAX_CANDIDATES
}

fn default_history_cap() -> usize {
    DEFAULT_HISTORY_CAP
}

fn default_provider_timeout() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECONDS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Target calendar in the remote store.
    pub calendar_id: String,

    /// IANA zone attached to roster times that carry none.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_match_tolerance")]
    pub match_tolerance_seconds: i64,

    #[serde(default = "default_max_candidates")]
    pub max_candidates_per_window: usize,

    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Overrides the default history location. `~` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_path: Option<PathBuf>,

    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_seconds: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<Remote>,
}

impl SyncConfig {
    /// A config with every option at its default.
    pub fn new(calendar_id: impl Into<String>) -> Self {
        SyncConfig {
            calendar_id: calendar_id.into(),
            timezone: default_timezone(),
            match_tolerance_seconds: default_match_tolerance(),
            max_candidates_per_window: default_max_candidates(),
            history_cap: default_history_cap(),
            history_path: None,
            provider_timeout_seconds: default_provider_timeout(),
            remote: None,
        }
    }

    pub fn config_path() -> RosterSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| RosterSyncError::Config("Could not determine config directory".into()))?
            .join("rostersync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load and validate `~/.config/rostersync/config.toml` plus environment overrides.
    pub fn load() -> RosterSyncResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> RosterSyncResult<Self> {
        if !path.exists() {
            return Err(RosterSyncError::Config(format!(
                "Config file not found at {}\n\n\
                Create it with:\n  rostersync config init",
                path.display()
            )));
        }

        let config: SyncConfig = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(Environment::with_prefix("ROSTERSYNC").try_parsing(true))
            .build()
            .map_err(|e| RosterSyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| RosterSyncError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values outside sane domains. Every failure here is a
    /// configuration fault.
    pub fn validate(&self) -> RosterSyncResult<()> {
        if self.calendar_id.trim().is_empty() {
            return Err(RosterSyncError::Config("calendar_id must not be empty".into()));
        }

        TimeNormalizer::new(&self.timezone)?;

        if self.match_tolerance_seconds < 0 {
            return Err(RosterSyncError::Config(format!(
                "match_tolerance_seconds must not be negative (got {})",
                self.match_tolerance_seconds
            )));
        }

        if self.match_tolerance_seconds > MAX_MATCH_TOLERANCE_SECONDS {
            return Err(RosterSyncError::Config(format!(
                "match_tolerance_seconds must be at most {} (got {})",
                MAX_MATCH_TOLERANCE_SECONDS, self.match_tolerance_seconds
            )));
        }

        if self.max_candidates_per_window == 0 {
            return Err(RosterSyncError::Config(
                "max_candidates_per_window must be at least 1".into(),
            ));
        }

        if self.history_cap == 0 {
            return Err(RosterSyncError::Config("history_cap must be at least 1".into()));
        }

        if self.provider_timeout_seconds == 0 {
            return Err(RosterSyncError::Config(
                "provider_timeout_seconds must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// The configured remote, with the provider timeout applied.
    pub fn remote(&self) -> RosterSyncResult<Remote> {
        let remote = self.remote.clone().ok_or_else(|| {
            RosterSyncError::Config(
                "No [remote] configured. Add one with a provider, e.g.:\n\n\
                [remote]\n\
                provider = \"google\"\n\
                google_account = \"you@gmail.com\""
                    .into(),
            )
        })?;

        Ok(remote.with_timeout(self.provider_timeout()))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_seconds)
    }

    pub fn history(&self) -> RosterSyncResult<RunHistory> {
        let path = match &self.history_path {
            Some(path) => {
                PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
            }
            None => RunHistory::default_path()?,
        };

        Ok(RunHistory::new(path, self.history_cap))
    }

    /// Create a default config file with optional settings commented out.
    pub fn create_default_config(path: &Path) -> RosterSyncResult<()> {
        let contents = format!(
            "\
# rostersync configuration

# Calendar to keep in step with the roster (\"primary\" for your main Google calendar):
calendar_id = \"primary\"

# Zone for roster times that don't carry one:
# timezone = \"{}\"

# How far (seconds) a calendar entry may drift from the roster and still match:
# match_tolerance_seconds = {}

# Candidate calendar entries fetched per roster shift:
# max_candidates_per_window = {}

# Run history size and location:
# history_cap = {}
# history_path = \"~/.local/share/rostersync/history.json\"

# Seconds allowed for each provider call:
# provider_timeout_seconds = {}

[remote]
provider = \"google\"
# google_account = \"you@gmail.com\"
",
            DEFAULT_TIMEZONE,
            DEFAULT_MATCH_TOLERANCE_SECONDS,
            DEFAULT_MAX_CANDIDATES,
            DEFAULT_HISTORY_CAP,
            DEFAULT_PROVIDER_TIMEOUT_SECONDS,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RosterSyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RosterSyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SyncConfig::new("roster");
        assert!(config.validate().is_ok());
        assert_eq!(config.match_tolerance_seconds, 18_000);
        assert_eq!(config.max_candidates_per_window, 10);
        assert_eq!(config.history_cap, 100);
    }

    #[test]
    fn test_negative_tolerance_is_rejected() {
        let config = SyncConfig {
            match_tolerance_seconds: -1,
            ..SyncConfig::new("roster")
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_config_fault());
    }

    #[test]
    fn test_zero_caps_are_rejected() {
        let zero_history = SyncConfig {
            history_cap: 0,
            ..SyncConfig::new("roster")
        };
        let zero_candidates = SyncConfig {
            max_candidates_per_window: 0,
            ..SyncConfig::new("roster")
        };
        assert!(zero_history.validate().is_err());
        assert!(zero_candidates.validate().is_err());
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let config = SyncConfig {
            timezone: "Not/A_Zone".into(),
            ..SyncConfig::new("roster")
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            RosterSyncError::InvalidTimezone(_)
        ));
    }

    #[test]
    fn test_empty_calendar_id_is_rejected() {
        assert!(SyncConfig::new("  ").validate().is_err());
    }

    #[test]
    fn test_load_from_file_with_remote() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            calendar_id = "roster@group.calendar.google.com"
            timezone = "Australia/Sydney"
            match_tolerance_seconds = 3600

            [remote]
            provider = "google"
            google_account = "me@example.com"
            "#,
        );

        let config = SyncConfig::load_from(&path).unwrap();
        assert_eq!(config.calendar_id, "roster@group.calendar.google.com");
        assert_eq!(config.timezone, "Australia/Sydney");
        assert_eq!(config.match_tolerance_seconds, 3600);
        assert_eq!(config.max_candidates_per_window, 10);

        let remote = config.remote().unwrap();
        assert_eq!(remote.provider.name(), "google");
        assert_eq!(remote.account_identifier(), Some("me@example.com"));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            calendar_id = "roster"
            history_cap = 0
            "#,
        );
        assert!(SyncConfig::load_from(&path).unwrap_err().is_config_fault());
    }

    #[test]
    fn test_missing_file_points_at_init() {
        let dir = tempfile::tempdir().unwrap();
        let err = SyncConfig::load_from(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("rostersync config init"));
    }

    #[test]
    fn test_default_config_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rostersync").join("config.toml");
        SyncConfig::create_default_config(&path).unwrap();

        let config = SyncConfig::load_from(&path).unwrap();
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
        assert!(config.remote.is_some());
    }

    #[test]
    fn test_missing_remote_is_config_fault() {
        let err = SyncConfig::new("roster").remote().unwrap_err();
        assert!(err.is_config_fault());
    }

    #[test]
    fn test_history_path_expands_tilde() {
        let config = SyncConfig {
            history_path: Some(PathBuf::from("~/roster/history.json")),
            ..SyncConfig::new("roster")
        };
        let history = config.history().unwrap();
        assert!(!history.path().starts_with("~"));
        assert!(history.path().ends_with("roster/history.json"));
    }
}
