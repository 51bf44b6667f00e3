//! Dashforge CLI - build dashboards from configurations and sync them with
//! the platform.

#![allow(clippy::print_stdout, clippy::doc_markdown)]

mod client;
mod commands;
mod error;
mod mappings;
mod paths;
mod settings;

use clap::{Parser, Subcommand};
use client::HttpClient;
use commands::{UpdateTarget, Workspace};
use error::Result;
use mappings::MappingStore;
use settings::Settings;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dashforge")]
#[command(about = "Build fully resolved dashboards from sparse metric configurations")]
#[command(version)]
struct Cli {
    /// Settings file (default: ./dashforge.toml when present)
    #[arg(long = "settings", global = true)]
    settings: Option<PathBuf>,

    /// Default layers directory
    #[arg(short, long, global = true)]
    defaults: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build dashboard JSON from configuration files
    Build {
        /// Config file or directory (default: configs directory)
        target: Option<PathBuf>,
    },

    /// Validate configurations without writing anything
    Check {
        /// Config file or directory (default: configs directory)
        target: Option<PathBuf>,
    },

    /// Build and upload new dashboards
    Create {
        /// Config file or directory (default: configs directory)
        target: Option<PathBuf>,

        /// Category to create dashboards in
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Rebuild and push existing dashboards
    ///
    /// `update <uuid> <file>`, `update <config>` or `update <dir>`;
    /// the last two look up uuids recorded by `create`.
    Update {
        #[arg(required = true, num_args = 1..=2)]
        args: Vec<String>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.settings.as_deref())?;
    if let Some(defaults) = cli.defaults {
        settings.defaults_dir = defaults;
    }
    debug!(?settings, "settings");
    let ws = Workspace::open(settings)?;
    let settings = &ws.settings;

    match cli.command {
        Commands::Build { target } => {
            let target = target.unwrap_or_else(|| settings.configs_dir.clone());
            commands::build(&ws, &target)?;
        }
        Commands::Check { target } => {
            let target = target.unwrap_or_else(|| settings.configs_dir.clone());
            commands::check(&ws, &target)?;
        }
        Commands::Create { target, category } => {
            let target = target.unwrap_or_else(|| settings.configs_dir.clone());
            let category = category.unwrap_or_else(|| settings.category.clone());
            let api = HttpClient::new(&settings.api_base, settings.api_key()?);
            let mut mappings = MappingStore::load(&settings.mappings_file)?;
            commands::create(&ws, &api, &mut mappings, &target, &category)?;
        }
        Commands::Update { args } => {
            let target = UpdateTarget::from_args(&args);
            let api = HttpClient::new(&settings.api_base, settings.api_key()?);
            let mut mappings = MappingStore::load(&settings.mappings_file)?;
            commands::update(&ws, &api, &mut mappings, &target)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
