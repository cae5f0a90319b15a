//! Error types for rostersync.

use thiserror::Error;

/// Errors that can occur while reconciling a roster with a remote calendar.
#[derive(Error, Debug)]
pub enum RosterSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown timezone '{0}' (expected an IANA name such as Australia/Melbourne)")]
    InvalidTimezone(String),

    #[error("Provider '{0}' not found in PATH. Install it with:\n  cargo install rostersync-provider-{0}")]
    ProviderNotInstalled(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("A sync for calendar '{0}' is already running")]
    AlreadyRunning(String),

    #[error("History error: {0}")]
    History(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RosterSyncError {
    /// Faults that make a run impossible to start. Everything else is
    /// scoped to the single event that hit it.
    pub fn is_config_fault(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::InvalidTimezone(_)
                | Self::ProviderNotInstalled(_)
                | Self::AlreadyRunning(_)
        )
    }
}

/// Result type alias for rostersync operations.
pub type RosterSyncResult<T> = Result<T, RosterSyncError>;
