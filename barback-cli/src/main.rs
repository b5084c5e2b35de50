//! Barback - browse, search and curate a cocktail catalog
//!
//! Main entry point: global flags, tracing setup and command dispatch.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use barback_core::BarbackConfig;

mod catalog_cli;
mod config_cli;
mod render;
mod shell;

/// Modules that can be traced individually
#[derive(Debug, Clone, ValueEnum)]
enum TraceModule {
    Store,
    Session,
    Provider,
    All,
}

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "barback",
    about = "Browse, search and curate a cocktail catalog",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Enable tracing for modules (comma-separated: store,session,provider,all)
    #[clap(long, value_delimiter = ',', global = true)]
    trace: Vec<TraceModule>,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    log_json: bool,

    /// Override configuration file path
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Search the catalog (no query browses the initial letters)
    Search {
        /// Name to search for
        query: Option<String>,

        /// Page to show
        #[clap(long, default_value_t = 1)]
        page: usize,

        /// Records per page (defaults to the configured page size)
        #[clap(long)]
        page_size: Option<usize>,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show details of a single record
    Show {
        /// Record id
        id: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// List the categories offered by the provider
    Categories,

    /// Inspect or initialise the configuration file
    Config {
        #[clap(subcommand)]
        command: config_cli::ConfigCommand,
    },

    /// Start an interactive browsing session
    Browse,
}

/// Initialize tracing with CLI flags
///
/// Logs always go to stderr so tables and JSON on stdout stay clean.
fn initialize_tracing(log_level: &LogLevel, trace_modules: &[TraceModule], json: bool) {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    for module in trace_modules {
        let directive = match module {
            TraceModule::Store => "barback_core::catalog=trace",
            TraceModule::Session => "barback_core::session=trace",
            TraceModule::Provider => "barback_core::provider=trace",
            TraceModule::All => "barback_core=trace",
        };

        if let Ok(parsed) = directive.parse() {
            filter = filter.add_directive(parsed);
        }
    }

    if json || !trace_modules.is_empty() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<BarbackConfig> {
    match path {
        Some(path) => BarbackConfig::load_from_path(path),
        None => BarbackConfig::load().context("Failed to load default configuration"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, &cli.trace, cli.log_json);

    let command = match cli.command {
        Command::Config { command } => return command.execute(cli.config.as_deref()),
        command => command,
    };

    let config = load_config(cli.config.as_ref())?;

    match command {
        Command::Search {
            query,
            page,
            page_size,
            json,
        } => catalog_cli::execute_search(&config, query.as_deref(), page, page_size, json).await,
        Command::Show { id, json } => catalog_cli::execute_show(&config, &id, json).await,
        Command::Categories => catalog_cli::execute_categories(&config).await,
        Command::Browse => shell::run(&config).await,
        Command::Config { .. } => unreachable!("handled above"),
    }
}
