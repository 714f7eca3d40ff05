//! Trellis CLI - Inspect and traverse graph snapshots

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, config as config_cmd, connections, stats, traverse, vertex};
use config::{config_file_path, Config};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about = "Inspect and traverse labeled multigraph snapshots")]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Config file path
    #[arg(long, env = "TRELLIS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a snapshot
    Stats(stats::StatsArgs),
    /// Show one vertex with its incident edges and neighbors
    Vertex(vertex::VertexArgs),
    /// List edges from one vertex to another
    Connections(connections::ConnectionsArgs),
    /// Traverse a snapshot from one or more roots
    Traverse(traverse::TraverseArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Settings resolved from the config file and global flags
pub struct AppContext {
    pub config_path: PathBuf,
    pub config: Config,
    pub format: OutputFormat,
}

impl AppContext {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = config_file_path(cli.config.as_deref());
        tracing::debug!("Using config at: {:?}", config_path);

        let config = Config::load(&config_path)?;
        let format = cli.format.unwrap_or(config.format);

        Ok(Self {
            config_path,
            config,
            format,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting trellis CLI");

    let ctx = AppContext::new(&cli)?;

    match &cli.command {
        Commands::Stats(args) => stats::run(args, &ctx)?,
        Commands::Vertex(args) => vertex::run(args, &ctx)?,
        Commands::Connections(args) => connections::run(args, &ctx)?,
        Commands::Traverse(args) => traverse::run(args, &ctx)?,
        Commands::Config(args) => config_cmd::run(args, &ctx)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
