// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `castwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "castwatch",
    version,
    about = "Watch live-stream channels and record them while they are live.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `castwatch.toml` in the current working directory, used only
    /// if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Channel URL or identifier; repeat for up to four channels.
    ///
    /// Replaces the `channels` list from the config file.
    #[arg(long = "channel", value_name = "URL|ID")]
    pub channels: Vec<String>,

    /// Seconds between status checks (minimum 10).
    #[arg(long, value_name = "SECS")]
    pub interval: Option<String>,

    /// Start recording automatically when a channel goes live.
    #[arg(long)]
    pub auto_record: bool,

    /// Directory recordings are written below.
    #[arg(long, value_name = "DIR")]
    pub save_path: Option<PathBuf>,

    /// yt-dlp executable.
    #[arg(long, value_name = "PATH")]
    pub ytdlp: Option<PathBuf>,

    /// ffmpeg executable.
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CASTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate settings, print them, but don't watch anything.
    #[arg(long)]
    pub dry_run: bool,
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
