//! Show supported languages and their resolved images.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::images::ImageRegistry;

pub async fn run() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::load(&cwd)?;
    let registry = ImageRegistry::new(&config.images);

    println!("\n{}", "━".repeat(60).dimmed());
    println!("{}", "   Supported languages".yellow().bold());
    println!("{}", "━".repeat(60).dimmed());

    for (language, image) in registry.entries() {
        println!("  {}", language.key().cyan().bold());
        println!("    Selectors:  {}", language.aliases().join(", "));
        println!("    Image:      {image}");
    }

    println!("{}", "━".repeat(60).dimmed());
    println!(
        "  Pull images with {}",
        "codespace image pull".green()
    );

    Ok(())
}
