//! frond CLI - static-site render pipeline.
//!
//! Provides commands for:
//! - `render`: Render every page of a local data file into an output directory
//! - `links`: Print the slug and permalink of every item

mod builtin;
mod commands;
mod error;
mod output;
mod project;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{LinksArgs, RenderArgs};
use error::CliError;
use output::Output;

/// frond - static-site render pipeline.
#[derive(Parser)]
#[command(name = "frond", version, about)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render pages from a local data file.
    Render(RenderArgs),
    /// Print slugs and permalinks.
    Links(LinksArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = tokio::runtime::Runtime::new()
        .map_err(CliError::from)
        .and_then(|rt| {
            rt.block_on(async {
                match cli.command {
                    Commands::Render(args) => args.execute().await,
                    Commands::Links(args) => args.execute().await,
                }
            })
        });

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
