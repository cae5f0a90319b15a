use anyhow::{Context, Result};
use google_calendar::types::SendUpdates;
use rostersync_core::RemoteEvent;
use rostersync_core::remote::protocol::UpdateEvent;

use crate::google_event::{FromGoogle, ToGoogle};
use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

pub async fn handle(cmd: UpdateEvent) -> Result<RemoteEvent> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let client = Session::load_valid(&config.google_account).await?.client()?;

    let mut google_event = cmd.event.to_google();
    google_event.id = cmd.event_id.clone();

    let response = client
        .events()
        .update(
            &cmd.calendar_id,
            &cmd.event_id,
            0,
            0,
            false,
            SendUpdates::None,
            false,
            &google_event,
        )
        .await
        .with_context(|| format!("Failed to update event {}", cmd.event_id))?;

    RemoteEvent::from_google(response.body)?
        .context("Google returned the updated event without a start and end time")
}
