//! Command-line interface for Crackerjack
//!
//! A thin layer over the engine: argument parsing with clap, configuration
//! loading, and styled or JSON output.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
mod output;

pub use output::Output;

use crate::config::EngineConfig;
use commands::run::RunArgs;

/// Crackerjack - cached, filtered and profiled quality-check hooks
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path (replaces user and repository config)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable quiet output (minimal)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the configured hooks
    Run(RunArgs),
    /// Inspect and maintain the result cache
    #[command(subcommand)]
    Cache(CacheCommands),
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Cache subcommands
#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show cache statistics
    Stats,
    /// Remove cached results
    Clear {
        /// Only remove results for this tool
        #[arg(long)]
        tool: Option<String>,
    },
    /// Drop every cached result for a file
    Invalidate {
        path: PathBuf,
    },
    /// List files with no cached result for a tool
    Changed {
        #[arg(long)]
        tool: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged configuration
    Show,
    /// Validate the merged configuration
    Validate,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let output = Output::new(self.verbose, self.quiet);

        let Some(command) = self.command else {
            // Show help when no command is provided
            Cli::command().print_help()?;
            return Ok(());
        };

        let config = EngineConfig::load_with_custom_config(self.config.as_deref())?;

        match command {
            Commands::Run(args) => {
                commands::run::execute(args, &config, self.format, &output).await
            }
            Commands::Cache(cmd) => commands::cache::execute(cmd, &config, self.format, &output),
            Commands::Config(cmd) => commands::config::execute(cmd, &config, self.format, &output),
        }
    }
}
