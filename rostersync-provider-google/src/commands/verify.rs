use anyhow::{Context, Result};
use google_calendar::types::MinAccessRole;
use rostersync_core::remote::protocol::Verify;

use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

/// Prove the stored session works by making one cheap API call.
pub async fn handle(cmd: Verify) -> Result<String> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let account_email = config.google_account;

    let client = Session::load_valid(&account_email).await?.client()?;

    client
        .calendar_list()
        .list_all(MinAccessRole::default(), false, false)
        .await
        .with_context(|| format!("Google rejected the credentials for {account_email}"))?;

    Ok(account_email)
}
