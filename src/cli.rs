// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "marshal")]
#[command(about = "Ordered multi-component rollouts with automatic rollback")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new marshal.yml configuration file
    Init {
        /// Rollout name
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Show the components in rollout order without running anything
    Plan {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Deploy and verify every component in order, rolling back on failure
    Run {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,

        /// Break an existing rollout lock
        #[arg(long)]
        force: bool,

        /// Fail if any deploy or verify failure was absorbed by a rollback
        #[arg(long)]
        strict: bool,
    },

    /// Undo every component in configured order, stopping at the first failure
    Rollback {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,

        /// Break an existing rollout lock
        #[arg(long)]
        force: bool,
    },
}
