use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::sensor_monitor::{ExtractOptions, SupervisorPolicy};

pub const ENV_IDLE_SEC: &str = "BRIDGE_SELFHEAL_IDLE_SEC";
pub const ENV_EXC_MAX: &str = "BRIDGE_SELFHEAL_EXC_MAX";
pub const ENV_PERIODIC_REOPEN_SEC: &str = "BRIDGE_PERIODIC_REOPEN_SEC";
pub const ENV_SUMMARY_EVERY_TICKS: &str = "BRIDGE_SUMMARY_EVERY_TICKS";
pub const ENV_DUMP_EVERY_TICKS: &str = "BRIDGE_DUMP_EVERY_TICKS";
pub const ENV_TICK_MS: &str = "BRIDGE_TICK_MS";
pub const ENV_TICKS: &str = "BRIDGE_TICKS";
pub const ENV_THROTTLE_DEFAULT_FALSE: &str = "BRIDGE_THROTTLE_DEFAULT_FALSE";
pub const ENV_LOG_FILE: &str = "BRIDGE_LOG_FILE";

/// Effective runtime settings, read once at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    pub idle_threshold_sec: u64,
    pub exc_threshold: u32,
    /// 0 disables the periodic reopen.
    pub periodic_reopen_sec: u64,
    /// 0 disables summary lines.
    pub summary_every_ticks: u64,
    /// 0 disables sensor dumps.
    pub dump_every_ticks: u64,
    pub tick_ms: u64,
    /// `None` runs until interrupted.
    pub max_ticks: Option<u64>,
    pub throttle_default_false: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            idle_threshold_sec: 300,
            exc_threshold: 5,
            periodic_reopen_sec: 0,
            summary_every_ticks: 60,
            dump_every_ticks: 0,
            tick_ms: 1000,
            max_ticks: None,
            throttle_default_false: false,
            log_file: None,
        }
    }
}

/// Integer setting: unparsable or missing falls back to the default,
/// out-of-range values are clamped.
fn read_clamped<F>(lookup: &F, name: &str, default: i64, min: i64, max: i64) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map_or(default, |v| v.clamp(min, max))
}

fn read_flag<F>(lookup: &F, name: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            let raw = raw.trim();
            raw == "1" || raw.eq_ignore_ascii_case("true")
        })
        .unwrap_or(false)
}

impl BridgeConfig {
    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_ticks = lookup(ENV_TICKS)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|t| *t > 0);

        let log_file = lookup(ENV_LOG_FILE)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        Self {
            idle_threshold_sec: read_clamped(&lookup, ENV_IDLE_SEC, 300, 30, 3600) as u64,
            exc_threshold: read_clamped(&lookup, ENV_EXC_MAX, 5, 1, 100) as u32,
            periodic_reopen_sec: read_clamped(&lookup, ENV_PERIODIC_REOPEN_SEC, 0, 0, 86_400) as u64,
            summary_every_ticks: read_clamped(&lookup, ENV_SUMMARY_EVERY_TICKS, 60, 0, 360_000)
                as u64,
            dump_every_ticks: read_clamped(&lookup, ENV_DUMP_EVERY_TICKS, 0, 0, 360_000) as u64,
            tick_ms: read_clamped(&lookup, ENV_TICK_MS, 1000, 100, 60_000) as u64,
            max_ticks,
            throttle_default_false: read_flag(&lookup, ENV_THROTTLE_DEFAULT_FALSE),
            log_file,
        }
    }

    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Interval override from the command line, clamped like the variable.
    pub fn set_tick_ms(&mut self, tick_ms: u64) {
        self.tick_ms = tick_ms.clamp(100, 60_000);
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn supervisor_policy(&self) -> SupervisorPolicy {
        SupervisorPolicy {
            idle_threshold: Duration::from_secs(self.idle_threshold_sec),
            exc_threshold: self.exc_threshold,
            periodic_interval: (self.periodic_reopen_sec > 0)
                .then(|| Duration::from_secs(self.periodic_reopen_sec)),
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            throttle_default_false: self.throttle_default_false,
        }
    }

    /// Platform log location used when `--log-file` is given without a path.
    pub fn default_log_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("sensor-bridge").join("bridge.log"))
    }
}
