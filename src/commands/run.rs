//! Sampling loop command handler.

use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::provider_for;
use crate::core::sensor_monitor::{HardwareSession, JsonLinesSink, SensorMonitor, SnapshotEmitter};
use crate::core::BridgeConfig;
use crate::error::BridgeError;
use crate::logging::init_logging;
use crate::platform::is_elevated;

/// Apply command-line overrides on top of the environment.
///
/// A bare `--log-file` needs the platform data directory; without one the
/// override is rejected.
pub fn apply_overrides(config: &mut BridgeConfig, matches: &ArgMatches) -> crate::Result<()> {
    if let Some(ticks) = matches.get_one::<u64>("ticks") {
        config.max_ticks = Some(*ticks);
    }
    if let Some(interval) = matches.get_one::<u64>("interval-ms") {
        config.set_tick_ms(*interval);
    }
    if let Some(path) = matches.get_one::<String>("log-file") {
        config.log_file = if path.trim().is_empty() {
            let default = BridgeConfig::default_log_path().ok_or_else(|| {
                BridgeError::config("--log-file without a path: no platform data directory")
            })?;
            Some(default)
        } else {
            Some(PathBuf::from(path))
        };
    }
    Ok(())
}

/// Execute the run command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = BridgeConfig::from_env();
    apply_overrides(&mut config, matches)?;
    init_logging(config.log_file.as_deref());

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        // stdout carries snapshots; notices go to stderr.
        eprintln!("{}", "Stopping after the current tick...".yellow().bold());
        stop_handler.store(true, Ordering::SeqCst);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let provider = provider_for(matches.get_one::<PathBuf>("fixture"));
    let session = HardwareSession::new(provider);
    let emitter = SnapshotEmitter::new(Box::new(JsonLinesSink::stdout()), is_elevated());

    let mut monitor = SensorMonitor::new(session, emitter, config);
    monitor.run(&stop);
    Ok(())
}
