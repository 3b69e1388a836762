// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod orchestrator;
pub mod probe;
pub mod record;
pub mod sink;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, RawConfigFile, default_config_path, load_or_default};
use crate::orchestrator::{Orchestrator, RecordSettings, RecordingBridge};
use crate::probe::YtDlpProbe;
use crate::record::{RecordingSupervisor, SupervisorOptions, ToolLauncher};
use crate::sink::{SharedSink, StdoutSink};
use crate::types::RawInterval;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - the recording supervisor and the yt-dlp probe
/// - one watcher per configured channel
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let mut raw = load_or_default(&config_path, args.config.is_some())
        .with_context(|| format!("loading {}", config_path.display()))?;
    apply_cli_overrides(&mut raw, &args);
    let cfg = ConfigFile::try_from(raw)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    if cfg.configured_channels().next().is_none() {
        bail!("no channels configured; pass --channel or set `channels` in the config file");
    }

    let sink: SharedSink = Arc::new(StdoutSink);
    let supervisor = Arc::new(RecordingSupervisor::new(
        Arc::new(ToolLauncher),
        Arc::clone(&sink),
        SupervisorOptions::default(),
    ));
    let bridge = Arc::new(RecordingBridge::new(
        supervisor,
        RecordSettings {
            auto_record: cfg.auto_record,
            ytdlp: cfg.tools.ytdlp.clone(),
            ffmpeg: cfg.tools.ffmpeg.clone(),
            save_path: cfg.save_path.clone(),
        },
        Arc::clone(&sink),
    ));
    let probe = Arc::new(YtDlpProbe::new(&cfg.tools.ytdlp));

    let mut orchestrator =
        Orchestrator::new(bridge, probe, Arc::clone(&sink), cfg.interval.as_duration());
    for (slot, input) in cfg.configured_channels() {
        orchestrator.set_channel(slot, input);
    }

    let running = orchestrator.start_all();
    if running == 0 {
        bail!("no channel could be started");
    }
    info!(running, interval_secs = cfg.interval.secs(), auto_record = cfg.auto_record, "monitoring");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    orchestrator.shutdown().await;
    Ok(())
}

/// Command-line values take precedence over the config file.
pub fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if !args.channels.is_empty() {
        raw.channels = args.channels.clone();
    }
    if let Some(ref interval) = args.interval {
        raw.config.check_interval = Some(RawInterval::Text(interval.clone()));
    }
    if args.auto_record {
        raw.config.auto_record = true;
    }
    if let Some(ref dir) = args.save_path {
        raw.config.save_path = Some(dir.clone());
    }
    if let Some(ref ytdlp) = args.ytdlp {
        raw.tools.ytdlp = ytdlp.clone();
    }
    if let Some(ref ffmpeg) = args.ffmpeg {
        raw.tools.ffmpeg = ffmpeg.clone();
    }
}

fn print_dry_run(cfg: &ConfigFile) {
    println!("castwatch dry-run");
    println!("  check_interval = {}s", cfg.interval.secs());
    println!("  auto_record = {}", cfg.auto_record);
    match cfg.save_path {
        Some(ref dir) => println!("  save_path = {}", dir.display()),
        None => println!("  save_path = (working directory)"),
    }
    println!("  ytdlp = {}", cfg.tools.ytdlp.display());
    println!("  ffmpeg = {}", cfg.tools.ffmpeg.display());
    println!();

    println!("channels:");
    for (slot, input) in cfg.configured_channels() {
        match watch::resolve_target(input) {
            Ok(target) => println!("  - {slot}: {target} ({})", probe::channel_url(&target)),
            Err(e) => println!("  - {slot}: {e}"),
        }
    }
}
