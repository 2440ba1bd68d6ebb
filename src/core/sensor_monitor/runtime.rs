//! The sampling loop.
//!
//! Strictly sequential: refresh, extract, emit, supervise, sleep. Nothing a
//! provider does inside a tick (error or panic) escapes the tick boundary.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use super::diagnostics::{dump_sensor_tree, summary_line, StateChangeTracker};
use super::extract::{extract_all, ExtractOptions};
use super::session::HardwareSession;
use super::snapshot::{MetricSnapshot, SnapshotEmitter};
use super::supervisor::{HealthSupervisor, ReopenReason};
use crate::core::config::BridgeConfig;
use crate::error::{BridgeError, Result};

/// Longest uninterrupted sleep; the stop flag is checked in between.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// The record handed to the sink, if the tick got that far.
    pub snapshot: Option<MetricSnapshot>,
    /// Provider fault that failed the tick.
    pub error: Option<String>,
    /// Exception-triggered recovery performed at the end of the tick.
    pub reopen: Option<ReopenReason>,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub failed_ticks: u64,
    pub emitted: u64,
    pub reopens: u64,
}

pub struct SensorMonitor {
    session: HardwareSession,
    supervisor: HealthSupervisor,
    emitter: SnapshotEmitter,
    tracker: StateChangeTracker,
    config: BridgeConfig,
    extract: ExtractOptions,
    interval: Duration,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Run a provider call, turning a panic into the error built by `fault`.
fn guarded<F>(fault: fn(String) -> BridgeError, call: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|payload| {
        Err(fault(format!(
            "provider panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

impl SensorMonitor {
    pub fn new(session: HardwareSession, emitter: SnapshotEmitter, config: BridgeConfig) -> Self {
        Self {
            supervisor: HealthSupervisor::new(config.supervisor_policy(), Instant::now()),
            extract: config.extract_options(),
            interval: config.tick_interval(),
            tracker: StateChangeTracker::new(),
            session,
            emitter,
            config,
        }
    }

    /// Override the sleep between ticks without the configured clamp.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn supervisor(&self) -> &HealthSupervisor {
        &self.supervisor
    }

    pub fn session(&self) -> &HardwareSession {
        &self.session
    }

    fn start_line(&self) -> String {
        format!(
            "[start] provider={} idleSec={} excMax={} periodicReopenSec={} summaryEvery={} dumpEvery={} tickMs={} isAdmin={}",
            self.session.provider_name(),
            self.config.idle_threshold_sec,
            self.config.exc_threshold,
            self.config.periodic_reopen_sec,
            self.config.summary_every_ticks,
            self.config.dump_every_ticks,
            self.interval.as_millis(),
            self.emitter.is_admin()
        )
    }

    /// Open the session if needed. A failure is logged and left for the
    /// exception recovery to retry.
    pub fn ensure_open(&mut self) {
        if self.session.is_open() {
            return;
        }
        let session = &mut self.session;
        if let Err(e) = guarded(BridgeError::ProviderOpen, || session.open()) {
            log::error!("[open] {e}");
        }
    }

    fn reopen(&mut self) {
        let session = &mut self.session;
        match guarded(BridgeError::ProviderOpen, || session.reopen()) {
            Ok(()) => log::info!("[selfheal] provider reopened"),
            Err(e) => log::error!("[selfheal] reopen failed: {e}"),
        }
    }

    fn sample(&mut self, tick: u64) -> Result<Option<MetricSnapshot>> {
        let session = &mut self.session;
        guarded(BridgeError::Refresh, || session.refresh().map(|_| ()))?;
        // Refresh may block; timestamps refer to when the data arrived.
        let now = Instant::now();
        let roots = self.session.hardware().ok_or(BridgeError::SessionNotOpen)?;

        if self.config.dump_every_ticks > 0 && tick % self.config.dump_every_ticks == 0 {
            log::info!("[dump] {}", dump_sensor_tree(roots));
        }

        let metrics = extract_all(roots, &self.extract);
        if metrics.has_any_value() {
            self.supervisor.record_good(now);
        }

        for line in self.tracker.observe(&metrics.flags) {
            log::info!("{line}");
        }

        if self.config.summary_every_ticks > 0 && tick % self.config.summary_every_ticks == 0 {
            let idle = self.supervisor.idle(now).as_secs();
            log::info!("{}", summary_line(tick, &metrics, idle));
        }

        let counters = self.supervisor.counters(now);
        match self.emitter.emit(metrics, counters) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                log::warn!("[output] {e}");
                Ok(None)
            }
        }
    }

    /// Run a single tick, including exception-triggered recovery.
    pub fn run_tick(&mut self) -> TickReport {
        let tick = self.supervisor.tick();
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        match self.sample(tick) {
            Ok(snapshot) => {
                report.snapshot = snapshot;
                self.supervisor.record_success();
            }
            Err(e) => {
                log::error!(
                    "[error] exception #{}: {e}",
                    self.supervisor.consecutive_exceptions() + 1
                );
                report.error = Some(e.to_string());
                if let Some(reason) = self.supervisor.record_failure(Instant::now()) {
                    log::warn!(
                        "[selfheal] {reason} >= {}, reopening",
                        self.supervisor.policy().exc_threshold
                    );
                    self.reopen();
                    report.reopen = Some(reason);
                }
            }
        }

        self.supervisor.advance_tick();
        report
    }

    /// Idle and periodic recovery, run between ticks.
    pub fn check_liveness(&mut self) -> Option<ReopenReason> {
        let reason = self.supervisor.check_liveness(Instant::now())?;
        log::warn!("[selfheal] {reason} -> reopening");
        self.reopen();
        Some(reason)
    }

    fn sleep_interruptible(&self, stop: &AtomicBool) {
        let deadline = Instant::now() + self.interval;
        loop {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }
            thread::sleep(remaining.min(SLEEP_SLICE));
        }
    }

    /// Loop until the tick limit is reached or `stop` is raised.
    pub fn run(&mut self, stop: &AtomicBool) -> RunStats {
        log::info!("{}", self.start_line());
        self.ensure_open();

        let mut stats = RunStats::default();
        loop {
            if stop.load(Ordering::SeqCst) {
                log::info!("[stop] interrupted");
                break;
            }

            let report = self.run_tick();
            stats.ticks += 1;
            if report.error.is_some() {
                stats.failed_ticks += 1;
            }
            if report.snapshot.is_some() {
                stats.emitted += 1;
            }

            if self
                .config
                .max_ticks
                .is_some_and(|max| self.supervisor.tick() >= max)
            {
                break;
            }

            self.check_liveness();
            self.sleep_interruptible(stop);
        }

        stats.reopens = self.supervisor.reopen_count();
        self.session.close();
        log::info!(
            "[stop] ticks={} failed={} emitted={} reopens={}",
            stats.ticks,
            stats.failed_ticks,
            stats.emitted,
            stats.reopens
        );
        stats
    }
}
