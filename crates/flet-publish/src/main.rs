//! flet-publish CLI - publish a Flet app as a standalone static web app.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use flet_bundle::{RouteUrlStrategy, WebRenderer};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "flet-publish")]
#[command(about = "Publish a Flet app as a standalone static web app")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to publish.toml config file
    #[arg(short, long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Package an app script into a static web bundle
    Publish(PublishArgs),

    /// Write a default publish.toml in the current directory
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },
}

/// Options for the publish command.
#[derive(Debug, clap::Args)]
pub struct PublishArgs {
    /// Path to a Python script
    pub script: PathBuf,

    /// Allow micropip to install pre-release Python packages
    #[arg(long)]
    pub pre: bool,

    /// Path to an assets directory
    #[arg(short, long = "assets")]
    pub assets_dir: Option<PathBuf>,

    /// Application title
    #[arg(long)]
    pub app_title: Option<String>,

    /// Application description
    #[arg(long)]
    pub app_description: Option<String>,

    /// Base URL for the app
    #[arg(long)]
    pub base_url: Option<String>,

    /// Web renderer to use [default: canvaskit]
    #[arg(long, value_enum)]
    pub web_renderer: Option<WebRenderer>,

    /// URL routing strategy [default: path]
    #[arg(long, value_enum)]
    pub route_url_strategy: Option<RouteUrlStrategy>,

    /// Output directory (defaults to "dist" next to the script)
    #[arg(short = 'o', long)]
    pub distpath: Option<PathBuf>,

    /// Prebuilt Flet web runtime directory
    #[arg(long, env = "FLET_WEB_DIR")]
    pub web_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Publish(args) => {
            commands::publish::run(args, &cli.config)?;
        }
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes)?;
        }
    }

    Ok(())
}
