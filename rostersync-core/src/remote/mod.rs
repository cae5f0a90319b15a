//! Remote calendar access.
//!
//! [`RemoteStore`] is the seam the reconciler talks to. [`Remote`] is the
//! production implementation, delegating every call to a provider binary.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::constants::DEFAULT_PROVIDER_TIMEOUT_SECONDS;
use crate::error::{RosterSyncError, RosterSyncResult};
use crate::event::{EventPayload, RemoteEvent};
use crate::remote::protocol::{CreateEvent, ListEvents, UpdateEvent, Verify};
use crate::remote::provider::Provider;
use crate::window::TimeWindow;

/// Gateway to a remote calendar.
///
/// Any call may fail; the reconciler charges such failures to the event
/// being processed rather than to the run.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Events whose start lies in `window`, ascending by start, at most
    /// `max_results` of them.
    async fn list_in_window(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
        max_results: usize,
    ) -> RosterSyncResult<Vec<RemoteEvent>>;

    /// Create an event; the store assigns its id.
    async fn insert(&self, calendar_id: &str, payload: &EventPayload) -> RosterSyncResult<RemoteEvent>;

    /// Replace the fields of an existing event.
    async fn update(
        &self,
        calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> RosterSyncResult<RemoteEvent>;
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECONDS)
}

/// Remote provider configuration (the `[remote]` table), usable as a store.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
    #[serde(skip, default = "default_timeout")]
    timeout: Duration,
}

impl Remote {
    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }

    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote {
            provider,
            config,
            timeout: default_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the account identifier for this remote, if present.
    ///
    /// Looks for a `{provider}_account` field in the config (e.g.,
    /// `google_account`).
    pub fn account_identifier(&self) -> Option<&str> {
        let key = format!("{}_account", self.provider.name());
        self.config.0.get(&key).and_then(|v| v.as_str())
    }

    /// Confirm the provider is installed and its credentials work.
    ///
    /// Failures here are configuration faults: they stop a run before any
    /// event is touched.
    pub async fn verify(&self) -> RosterSyncResult<String> {
        self.provider.binary_path()?;

        self.provider
            .call(
                Verify {
                    remote_config: self.remote_config(),
                },
                self.timeout,
            )
            .await
            .map_err(|e| match e {
                RosterSyncError::Provider(msg) => {
                    RosterSyncError::Config(format!("Remote store unusable: {msg}"))
                }
                other => other,
            })
    }
}

#[async_trait]
impl RemoteStore for Remote {
    #[instrument(skip(self, window), fields(provider = %self.provider.name()))]
    async fn list_in_window(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
        max_results: usize,
    ) -> RosterSyncResult<Vec<RemoteEvent>> {
        self.provider
            .call(
                ListEvents {
                    remote_config: self.remote_config(),
                    calendar_id: calendar_id.to_string(),
                    from: window.from_rfc3339(),
                    to: window.to_rfc3339(),
                    max_results,
                },
                self.timeout,
            )
            .await
    }

    #[instrument(skip(self, payload), fields(provider = %self.provider.name(), summary = %payload.summary))]
    async fn insert(&self, calendar_id: &str, payload: &EventPayload) -> RosterSyncResult<RemoteEvent> {
        self.provider
            .call(
                CreateEvent {
                    remote_config: self.remote_config(),
                    calendar_id: calendar_id.to_string(),
                    event: payload.clone(),
                },
                self.timeout,
            )
            .await
    }

    #[instrument(skip(self, payload), fields(provider = %self.provider.name(), summary = %payload.summary))]
    async fn update(
        &self,
        calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> RosterSyncResult<RemoteEvent> {
        self.provider
            .call(
                UpdateEvent {
                    remote_config: self.remote_config(),
                    calendar_id: calendar_id.to_string(),
                    event_id: event_id.to_string(),
                    event: payload.clone(),
                },
                self.timeout,
            )
            .await
    }
}
