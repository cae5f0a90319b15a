//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `rostersync-provider-google`) using JSON over stdin/stdout.
//!
//! Providers manage their own credentials and tokens. Core just passes
//! provider-specific parameters from the `[remote]` config table.

use crate::error::{RosterSyncError, RosterSyncResult};
use crate::remote::protocol::{Authenticate, Command, ProviderCommand, Request, Response};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Sign-in involves the user, so it gets much longer than a data call.
const AUTH_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("rostersync-provider-{}", self.0)
    }

    /// Locate the provider binary on PATH.
    pub fn binary_path(&self) -> RosterSyncResult<PathBuf> {
        which::which(self.binary_name())
            .map_err(|_| RosterSyncError::ProviderNotInstalled(self.0.clone()))
    }

    /// Run the provider's sign-in flow and return the account identifier.
    pub async fn authenticate(&self) -> RosterSyncResult<String> {
        self.call(Authenticate {}, AUTH_TIMEOUT).await
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(
        &self,
        cmd: C,
        limit: Duration,
    ) -> RosterSyncResult<C::Response> {
        timeout(limit, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| RosterSyncError::ProviderTimeout(limit.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> RosterSyncResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| RosterSyncError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| RosterSyncError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        tracing::debug!(provider = %self.0, ?command, "Calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RosterSyncError::Provider(format!(
                    "Failed to spawn {}: {}",
                    binary_path.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RosterSyncError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(RosterSyncError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(RosterSyncError::Provider(
                "Provider returned no response".into(),
            ));
        }

        parse_response(&response_str)
    }
}

fn parse_response<R: serde::de::DeserializeOwned>(raw: &str) -> RosterSyncResult<R> {
    let response: Response<R> = serde_json::from_str(raw.trim())
        .map_err(|e| RosterSyncError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error } => Err(RosterSyncError::Provider(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_name_is_prefixed() {
        assert_eq!(
            Provider::from_name("google").binary_name(),
            "rostersync-provider-google"
        );
    }

    #[test]
    fn test_missing_binary_is_not_installed() {
        let err = Provider::from_name("definitely-not-a-real-provider")
            .binary_path()
            .unwrap_err();
        assert!(matches!(err, RosterSyncError::ProviderNotInstalled(_)));
    }

    #[test]
    fn test_parse_success_response() {
        let data: String = parse_response(r#"{"status":"success","data":"me@example.com"}"#).unwrap();
        assert_eq!(data, "me@example.com");
    }

    #[test]
    fn test_parse_error_response_becomes_provider_error() {
        let err = parse_response::<String>(r#"{"status":"error","error":"quota exceeded"}"#)
            .unwrap_err();
        assert!(matches!(err, RosterSyncError::Provider(ref msg) if msg == "quota exceeded"));
    }

    #[test]
    fn test_malformed_response_is_provider_error() {
        let err = parse_response::<String>("not json").unwrap_err();
        assert!(matches!(err, RosterSyncError::Provider(_)));
        assert!(!err.is_config_fault());
    }
}
