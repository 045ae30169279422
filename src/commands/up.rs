//! Provision a sandbox and print its endpoint.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;

use crate::config::Config;
use crate::sandbox::{DockerRuntime, SandboxManager};

pub async fn run(user: String, language: String, json: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::load(&cwd)?;

    let runtime = Arc::new(DockerRuntime::connect()?);
    let manager = SandboxManager::new(runtime, config)?;

    match manager.provision(&user, &language).await {
        Ok(provisioned) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&provisioned)?);
            } else {
                println!("\n{} Sandbox ready", "✓".green().bold());
                println!("  Endpoint:  {}", provisioned.endpoint.cyan());
                println!("  Sandbox:   {}", provisioned.sandbox_id.cyan());
                println!(
                    "\n  Tear it down with {}",
                    format!("codespace down {}", provisioned.sandbox_id).green()
                );
            }
            Ok(())
        }
        Err(err) => {
            if err.is_not_ready() {
                println!(
                    "{} The sandbox is still warming up; it was left running.",
                    "ℹ".blue()
                );
                println!("  Retry shortly, or remove it with codespace down.");
            } else if err.is_retryable() {
                println!("{} This failure is usually transient; retry.", "ℹ".blue());
            } else if err.is_client_error() {
                println!(
                    "{} Check the language name and the configured images.",
                    "ℹ".blue()
                );
            }
            Err(err.into())
        }
    }
}
