// ABOUTME: Entry point for the marshal CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use marshal::config;
use marshal::error::{Error, Result};
use marshal::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, Output::new(mode)).await {
        let component = match e {
            Error::Rollout(ref rollout) => Some(rollout.component().as_str()),
            _ => None,
        };
        Output::new(mode).error(&e.to_string(), component);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    let cwd = env::current_dir()?;

    match cli.command {
        Commands::Init { name, force } => {
            config::init_config(&cwd, name.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Plan { destination } => commands::plan(&cwd, destination.as_deref(), output),
        Commands::Run {
            destination,
            force,
            strict,
        } => commands::run(&cwd, destination.as_deref(), force, strict, output).await,
        Commands::Rollback { destination, force } => {
            commands::rollback(&cwd, destination.as_deref(), force, output).await
        }
    }
}
