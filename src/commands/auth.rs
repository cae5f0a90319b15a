use anyhow::Result;
use owo_colors::OwoColorize;
use rostersync_core::remote::provider::Provider;

pub async fn run(provider_name: &str) -> Result<()> {
    let provider = Provider::from_name(provider_name);

    println!("Authenticating with {provider_name}...");
    println!("Follow the sign-in link below and finish in your browser.\n");

    // Provider handles the full OAuth flow and stores its own tokens. It
    // writes the consent URL to stderr, so nothing here may redraw the terminal
    // until it returns.
    let account = provider.authenticate().await?;

    println!("Authenticated as: {}\n", account.green());
    println!("Point rostersync at this account in your config file:\n");
    println!("{}", config_snippet(provider_name, &account));
    println!("\nThen run `rostersync sync <roster.ics>`.");

    Ok(())
}

fn config_snippet(provider_name: &str, account: &str) -> String {
    format!("  [remote]\n  provider = \"{provider_name}\"\n  {provider_name}_account = \"{account}\"")
}
