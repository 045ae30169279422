//! Write a starter `codespace.toml` into the current directory.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::templates;

/// Result of attempting to write the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteResult {
    Created,
    Overwritten,
    Skipped,
}

/// Runs the init command.
pub async fn run(force: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    info!("Initializing codespace in {}", cwd.display());

    let (path, result) = write_config(&cwd, force)?;

    match result {
        WriteResult::Created => {
            println!(
                "\n{} Wrote {}",
                "✓".green().bold(),
                path.display().to_string().cyan()
            );
        }
        WriteResult::Overwritten => {
            println!(
                "\n{} Overwrote {}",
                "↻".blue(),
                path.display().to_string().cyan()
            );
        }
        WriteResult::Skipped => {
            println!(
                "\n{} {} already exists (use --force to overwrite)",
                "⊘".yellow(),
                path.display()
            );
            return Ok(());
        }
    }

    println!("\n{}", "Next steps:".yellow().bold());
    println!(
        "  1. Adjust image names and the port range in {}",
        "codespace.toml".cyan()
    );
    println!(
        "  2. Pull the sandbox images with {}",
        "codespace image pull".green()
    );
    println!(
        "  3. Start a sandbox with {}",
        "codespace up --user <id> --language python".green()
    );

    Ok(())
}

/// Writes the default config, honoring `--force` for existing files.
fn write_config(dir: &Path, force: bool) -> Result<(PathBuf, WriteResult)> {
    let path = dir.join("codespace.toml");

    if path.exists() && !force {
        return Ok((path, WriteResult::Skipped));
    }

    let existed = path.exists();
    fs::write(&path, templates::CODESPACE_TOML)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let result = if existed {
        WriteResult::Overwritten
    } else {
        WriteResult::Created
    };
    Ok((path, result))
}
