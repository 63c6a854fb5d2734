// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `bootdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bootdag",
    version,
    about = "Run interdependent startup jobs level by level, in parallel where possible.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Bootdag.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Bootdag.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BOOTDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate and print the execution plan, but don't run any job.
    #[arg(long)]
    pub dry_run: bool,

    /// Log the adjacency matrix, all paths and the level order on start,
    /// regardless of `[config].diagnostics`.
    #[arg(long)]
    pub diagnostics: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
