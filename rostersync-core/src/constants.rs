/// Zone attached to roster times that carry no zone of their own.
pub const DEFAULT_TIMEZONE: &str = "Australia/Melbourne";

/// How far (in seconds) a remote start may drift from the roster start
/// and still count as the same shift. Also pads the candidate window.
pub const DEFAULT_MATCH_TOLERANCE_SECONDS: i64 = 5 * 60 * 60;

/// Candidate remote events fetched per roster event.
pub const DEFAULT_MAX_CANDIDATES: usize = 10;

/// Run history entries kept on disk.
pub const DEFAULT_HISTORY_CAP: usize = 100;

/// Upper bound on a single provider round trip.
pub const DEFAULT_PROVIDER_TIMEOUT_SECONDS: u64 = 10;

/// Timestamp format used in run history entries.
pub const HISTORY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
