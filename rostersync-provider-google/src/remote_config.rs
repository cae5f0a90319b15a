//! Google-specific remote configuration.
//!
//! Typed view over the generic `[remote]` table that rostersync forwards
//! with every request.

use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleRemoteConfig {
    pub google_account: String,
}

impl TryFrom<&serde_json::Map<String, serde_json::Value>> for GoogleRemoteConfig {
    type Error = anyhow::Error;

    fn try_from(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let google_account = map
            .get("google_account")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Missing required field: google_account (set it under [remote] in the rostersync config)"
                )
            })?
            .to_string();

        Ok(Self { google_account })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_account() {
        let map = serde_json::json!({ "google_account": "me@example.com", "extra": 1 });
        let config = GoogleRemoteConfig::try_from(map.as_object().unwrap()).unwrap();
        assert_eq!(config.google_account, "me@example.com");
    }

    #[test]
    fn test_missing_or_blank_account_is_error() {
        let missing = serde_json::Map::new();
        let blank = serde_json::json!({ "google_account": "  " });

        assert!(GoogleRemoteConfig::try_from(&missing).is_err());
        assert!(GoogleRemoteConfig::try_from(blank.as_object().unwrap()).is_err());
    }
}
