use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod images;
mod ports;
mod probe;
mod sandbox;
mod sessions;
mod templates;

#[derive(Parser)]
#[command(name = "codespace")]
#[command(
    author,
    version,
    about = "On-demand per-student code-server sandboxes for the coding lab"
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter codespace.toml in the current directory
    Init {
        /// Force overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Provision a sandbox and print its endpoint
    Up {
        /// Owner the sandbox is provisioned for
        #[arg(short, long)]
        user: String,

        /// Language environment (e.g. python, javascript, java, cpp)
        #[arg(short, long)]
        language: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stop and remove a sandbox
    Down {
        /// Sandbox id as printed by `up` or `list`
        sandbox_id: String,
    },

    /// Show sandboxes the runtime currently knows about
    List {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show supported languages and their images
    Languages,

    /// Manage the per-language sandbox images
    Image {
        #[command(subcommand)]
        action: commands::image::ImageAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("codespace=debug")
    } else {
        EnvFilter::new("codespace=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { force } => {
            commands::init::run(force).await?;
        }
        Commands::Up {
            user,
            language,
            json,
        } => {
            commands::up::run(user, language, json).await?;
        }
        Commands::Down { sandbox_id } => {
            commands::down::run(sandbox_id).await?;
        }
        Commands::List { json } => {
            commands::list::run(json).await?;
        }
        Commands::Languages => {
            commands::languages::run().await?;
        }
        Commands::Image { action } => {
            commands::image::run(action).await?;
        }
    }

    Ok(())
}
