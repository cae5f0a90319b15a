//! Core of rostersync: keeps a remote calendar in step with a shift roster.
//!
//! - `ics` turns roster exports into [`SourceEvent`]s
//! - `reconcile` matches each one against the remote calendar and creates or
//!   updates entries through a [`RemoteStore`]
//! - `history` keeps a bounded log of run statistics
//! - `remote` talks to provider binaries over the JSON-lines protocol

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod history;
pub mod ics;
pub mod lock;
pub mod matcher;
pub mod observer;
pub mod outcome;
pub mod reconcile;
pub mod remote;
pub mod tz;
pub mod window;

pub use config::SyncConfig;
pub use error::{RosterSyncError, RosterSyncResult};
pub use event::*;
pub use history::{HistoryEntry, RunHistory};
pub use lock::RunLock;
pub use matcher::Matcher;
pub use observer::{NoopObserver, SyncObserver, SyncProgress, TracingObserver};
pub use outcome::{EventOutcome, Outcome, RunReport, RunStats};
pub use reconcile::Reconciler;
pub use remote::{Remote, RemoteConfig, RemoteStore};
pub use tz::TimeNormalizer;
pub use window::TimeWindow;
