//! Stop and remove a sandbox.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;

use crate::config::Config;
use crate::sandbox::{DockerRuntime, SandboxManager};

pub async fn run(sandbox_id: String) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::load(&cwd)?;

    let runtime = Arc::new(DockerRuntime::connect()?);
    let manager = SandboxManager::new(runtime, config)?;

    // Teardown is best-effort: an already-gone sandbox is a success, and a
    // failed stop is only reported, since auto-remove reclaims the container
    // once it exits.
    if manager.terminate(&sandbox_id).await {
        println!("{} Sandbox {} stopped", "✓".green().bold(), sandbox_id.cyan());
    } else {
        println!(
            "{} Could not confirm teardown of {}; the runtime reclaims it when it exits",
            "⚠".yellow(),
            sandbox_id.cyan()
        );
    }

    Ok(())
}
