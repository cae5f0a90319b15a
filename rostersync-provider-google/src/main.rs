//! rostersync-provider-google - Google Calendar remote store for rostersync
//!
//! Speaks the rostersync provider protocol: one JSON request per line on
//! stdin, one JSON response per line on stdout. Logs go to stderr.
//!
//! The provider manages its own credentials and tokens:
//!   ~/.config/rostersync/providers/google/app_config.toml
//!   ~/.config/rostersync/providers/google/session/{account}.toml

mod app_config;
mod commands;
mod google_event;
mod remote_config;
mod session;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use rostersync_core::remote::protocol::{Command, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&format!("Failed to parse request: {e}")),
        };

        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }

    Ok(())
}

async fn handle_request(request: Request) -> String {
    tracing::debug!(command = ?request.command, "Handling request");

    match request.command {
        Command::Authenticate => respond(commands::authenticate::handle().await),
        Command::Verify => match parse(request.params) {
            Ok(cmd) => respond(commands::verify::handle(cmd).await),
            Err(e) => e,
        },
        Command::ListEvents => match parse(request.params) {
            Ok(cmd) => respond(commands::list_events::handle(cmd).await),
            Err(e) => e,
        },
        Command::CreateEvent => match parse(request.params) {
            Ok(cmd) => respond(commands::create_event::handle(cmd).await),
            Err(e) => e,
        },
        Command::UpdateEvent => match parse(request.params) {
            Ok(cmd) => respond(commands::update_event::handle(cmd).await),
            Err(e) => e,
        },
    }
}

/// Deserialize command params, or produce the error response to send back.
fn parse<C: DeserializeOwned>(params: serde_json::Value) -> std::result::Result<C, String> {
    serde_json::from_value(params).map_err(|e| Response::error(&format!("Invalid params: {e}")))
}

fn respond<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(data) => Response::success(data),
        Err(e) => {
            tracing::warn!("{e:#}");
            Response::error(&format!("{e:#}"))
        }
    }
}
