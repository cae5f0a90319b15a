use anyhow::Result;
use owo_colors::OwoColorize;
use rostersync_core::{RunHistory, SyncConfig};

pub fn init(force: bool) -> Result<()> {
    let path = SyncConfig::config_path()?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}\n\nUse --force to overwrite it.",
            path.display()
        );
    }

    SyncConfig::create_default_config(&path)?;
    println!("Wrote default config to {}", path.display().green());
    println!("\nSign in next with:\n  rostersync auth google");

    Ok(())
}

pub fn path() -> Result<()> {
    let config_path = SyncConfig::config_path()?;
    let history_path = match SyncConfig::load() {
        Ok(config) => config.history()?.path().to_path_buf(),
        Err(_) => RunHistory::default_path()?,
    };

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  History:    {}", history_path.display());
    println!(
        "  Providers:  {}",
        config_path
            .parent()
            .map(|p| p.join("providers"))
            .unwrap_or_default()
            .display()
    );

    Ok(())
}
