//! Show sandboxes the runtime currently knows about.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;

use crate::config::Config;
use crate::sandbox::{DockerRuntime, SandboxManager};

pub async fn run(json: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::load(&cwd)?;

    let runtime = Arc::new(DockerRuntime::connect()?);
    let manager = SandboxManager::new(runtime, config)?;

    let mut sandboxes = manager.running_sandboxes().await?;
    sandboxes.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    if json {
        println!("{}", serde_json::to_string_pretty(&sandboxes)?);
        return Ok(());
    }

    if sandboxes.is_empty() {
        println!("\n{} No sandboxes running.", "ℹ".blue());
        println!(
            "  Start one with {}",
            "codespace up --user <id> --language <lang>".green()
        );
        return Ok(());
    }

    println!("\n{}", "━".repeat(72).dimmed());
    println!("{}", "   Sandboxes".yellow().bold());
    println!("{}", "━".repeat(72).dimmed());

    for sandbox in &sandboxes {
        let state = if sandbox.running {
            "running".green().bold()
        } else {
            "stopped".red()
        };
        println!("  {}  [{}]", sandbox.name.cyan(), state);
        println!("    Id:        {}", sandbox.id);
        println!(
            "    Owner:     {}",
            sandbox.owner.as_deref().unwrap_or("unknown")
        );
        println!(
            "    Language:  {}",
            sandbox.language.as_deref().unwrap_or("unknown")
        );
        println!("    Image:     {}", sandbox.image);
        if let Some(port) = sandbox.host_port {
            println!("    Port:      {port}");
        }
        if let Some(created) = sandbox.created_at {
            println!("    Created:   {}", created.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }

    println!("{}", "━".repeat(72).dimmed());
    Ok(())
}
