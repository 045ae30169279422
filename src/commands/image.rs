//! Docker image management for the per-language sandbox images.
//!
//! Provisioning refuses to run against a missing image; these commands are
//! the operator's remedy.

use anyhow::{Context, Result};
use bollard::image::{CreateImageOptions, ListImagesOptions};
use bollard::service::ImageSummary;
use bollard::Docker;
use clap::Subcommand;
use colored::Colorize;
use futures_util::StreamExt;
use tracing::{info, warn};

use crate::config::Config;
use crate::images::{ImageRegistry, Language};
use crate::sandbox::docker::{image_present, parse_image_tag};

/// Image management actions.
#[derive(Subcommand, Debug)]
pub enum ImageAction {
    /// Pull sandbox images from the registry
    Pull {
        /// Only pull the image for this language
        #[arg(short, long)]
        language: Option<String>,

        /// Force pull even if the image exists locally
        #[arg(long, default_value = "false")]
        force: bool,
    },

    /// Show which sandbox images are present locally
    Status,
}

/// Run image management command.
pub async fn run(action: ImageAction) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::load(&cwd)?;
    let registry = ImageRegistry::new(&config.images);

    match action {
        ImageAction::Pull { language, force } => {
            let targets: Vec<(Language, String)> = match language {
                Some(selector) => {
                    let (lang, image) = registry.resolve(&selector)?;
                    vec![(lang, image)]
                }
                None => registry
                    .entries()
                    .map(|(lang, image)| (lang, image.to_string()))
                    .collect(),
            };

            for (language, image) in targets {
                println!("{} {} ({image})", "→".bold(), language.key().cyan());
                pull_image(&image, force).await?;
            }
        }
        ImageAction::Status => {
            show_status(&registry).await?;
        }
    }

    Ok(())
}

/// Pull a sandbox image from the registry, skipping images that are already
/// present unless forced.
async fn pull_image(image: &str, force: bool) -> Result<()> {
    let docker = Docker::connect_with_local_defaults()
        .context("Failed to connect to Docker. Is Docker running?")?;

    docker
        .ping()
        .await
        .context("Cannot ping Docker daemon. Is Docker running?")?;

    if !force && image_present(&docker, image).await? {
        info!("Image '{}' found locally. Skipping pull.", image);
        println!("  Already present (use --force to pull anyway).");
        return Ok(());
    }

    info!("Pulling Docker image: {}", image);

    let pull_options = CreateImageOptions {
        from_image: image,
        ..Default::default()
    };

    let mut stream = docker.create_image(Some(pull_options), None, None);
    let mut last_output = String::new();

    loop {
        let chunk_result = stream.next().await;
        match chunk_result {
            Some(Ok(output)) => {
                if let Some(status) = &output.status {
                    let trimmed = status.trim();
                    if !trimmed.is_empty() {
                        println!("  {trimmed}");
                        last_output = trimmed.to_string();
                    }
                } else if let Some(error) = &output.error {
                    anyhow::bail!("Docker pull error: {error}");
                }
            }
            Some(Err(e)) => {
                anyhow::bail!("Error pulling image: {e}");
            }
            None => break,
        }
    }

    if last_output.contains("Downloaded") || last_output.contains("Image is up to date") {
        info!("Image pulled successfully: {}", image);
    } else {
        warn!("Pull completed, but success message not found.");
    }

    Ok(())
}

/// Show presence and size of every configured sandbox image.
async fn show_status(registry: &ImageRegistry) -> Result<()> {
    let docker = Docker::connect_with_local_defaults()
        .context("Failed to connect to Docker. Is Docker running?")?;

    docker
        .ping()
        .await
        .context("Cannot ping Docker daemon. Is Docker running?")?;

    let images = docker
        .list_images(Some(ListImagesOptions::<String> {
            all: true,
            ..Default::default()
        }))
        .await
        .context("Failed to list images")?;

    println!("\n{}", "━".repeat(60).dimmed());
    println!("{}", "   Sandbox images".yellow().bold());
    println!("{}", "━".repeat(60).dimmed());

    for (language, image) in registry.entries() {
        match find_image(&images, image) {
            Some(summary) => {
                println!(
                    "  {}  {} [{}]",
                    language.key().cyan().bold(),
                    image,
                    "found".green()
                );
                println!("    Size: {}", format_size(summary.size));
            }
            None => {
                println!(
                    "  {}  {} [{}]",
                    language.key().cyan().bold(),
                    image,
                    "missing".red()
                );
                println!(
                    "    Pull it with: codespace image pull --language {}",
                    language.key()
                );
            }
        }
    }

    println!("{}", "━".repeat(60).dimmed());
    Ok(())
}

/// Find the local image summary matching a `name:tag` reference.
fn find_image<'a>(images: &'a [ImageSummary], image: &str) -> Option<&'a ImageSummary> {
    let (name, tag) = parse_image_tag(image);

    images.iter().find(|img| {
        img.repo_tags.iter().any(|tag_str| {
            if let Some(colon_pos) = tag_str.rfind(':') {
                let (n, t) = tag_str.split_at(colon_pos);
                n == name && &t[1..] == tag
            } else {
                tag_str == name && tag == "latest"
            }
        })
    })
}

/// Human-readable image size.
fn format_size(size: i64) -> String {
    // Precision loss is acceptable for display purposes.
    #[allow(clippy::cast_precision_loss)]
    let size = size.unsigned_abs() as f64;
    let size_megabytes = size / 1_048_576.0;
    let size_gigabytes = size_megabytes / 1024.0;
    if size_gigabytes >= 1.0 {
        format!("{size_gigabytes:.2} GB")
    } else {
        format!("{size_megabytes:.2} MB")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(512 * 1024 * 1024), "512.00 MB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.00 GB");
    }

    #[test]
    fn test_find_image_matches_tag() {
        let summary = ImageSummary {
            repo_tags: vec!["codespace-python:latest".to_string()],
            ..Default::default()
        };
        let images = vec![summary];

        assert!(find_image(&images, "codespace-python:latest").is_some());
        assert!(find_image(&images, "codespace-python").is_some());
        assert!(find_image(&images, "codespace-python:v2").is_none());
        assert!(find_image(&images, "codespace-java:latest").is_none());
    }

    #[tokio::test]
    async fn test_pull_skips_when_docker_unavailable() {
        // Gracefully errors (rather than panics) without a daemon.
        let result = pull_image("nonexistent:image", false).await;
        match result {
            Ok(()) => {}
            Err(e) => {
                let message = e.to_string().to_lowercase();
                assert!(
                    message.contains("docker") || message.contains("image"),
                    "Unexpected error: {message}"
                );
            }
        }
    }
}
