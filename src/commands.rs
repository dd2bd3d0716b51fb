use crate::client::{ChatTransport, HttpTransport};
use crate::config::Config;
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::ExitCode;

/// Send a single message and print the raw reply
pub async fn ask(config: &Config, text: &str) -> Result<ExitCode> {
    if text.trim().is_empty() {
        bail!("Nothing to send: the message is empty");
    }

    let transport = HttpTransport::new(config)?;
    match transport.send(text).await {
        Ok(reply) => {
            println!("{reply}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "request failed");
            eprintln!("{}", config.fallback_message);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Print the effective configuration, optionally writing it to `path`
pub fn show_config(config: &Config, write_to: Option<&Path>) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    print!("{content}");

    if let Some(path) = write_to {
        config.save_to(path)?;
        eprintln!("📝 Wrote {}", path.display());
    }
    Ok(())
}
