//! evflat CLI: the main entry point.
//!
//! Commands:
//! - `run`      Flatten a JSON-lines event stream into rows
//! - `check`    Load and validate a configuration
//! - `resolve`  Show how configured names resolve against a menu file
//! - `init`     Print a default configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "evflat",
    about = "evflat: per-event row assembly for collision data",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten an event stream into rows
    Run {
        /// Configuration file (default: $EVFLAT_CONFIG or ./evflat.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON-lines source, `-` or omitted for stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Row output path, `-` for stdout (overrides output.path)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate configuration and print a summary
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Resolve configured trigger and filter names against a menu file
    Resolve {
        /// JSON menu file
        #[arg(short, long)]
        menu: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a default configuration file
    Init,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for rows and reports
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Run {
            config,
            input,
            output,
        } => commands::run::run(config, input, output)?,
        Commands::Check { config } => commands::check::run(config)?,
        Commands::Resolve { menu, config } => commands::resolve::run(menu, config)?,
        Commands::Init => commands::init::run()?,
    }

    Ok(())
}
