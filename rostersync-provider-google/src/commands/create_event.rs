use anyhow::{Context, Result};
use google_calendar::types::SendUpdates;
use rostersync_core::RemoteEvent;
use rostersync_core::remote::protocol::CreateEvent;

use crate::google_event::{FromGoogle, ToGoogle};
use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

pub async fn handle(cmd: CreateEvent) -> Result<RemoteEvent> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let client = Session::load_valid(&config.google_account).await?.client()?;

    // Google assigns the id
    let google_event = cmd.event.to_google();

    let response = client
        .events()
        .insert(
            &cmd.calendar_id,
            0,
            0,
            false,
            SendUpdates::None,
            false,
            &google_event,
        )
        .await
        .with_context(|| format!("Failed to create event: {}", google_event.summary))?;

    RemoteEvent::from_google(response.body)?
        .context("Google returned the new event without a start and end time")
}
