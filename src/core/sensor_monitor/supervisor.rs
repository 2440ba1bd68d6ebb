//! Self-healing decisions for the sampling loop.
//!
//! The supervisor never touches the session itself. It is fed the outcome of
//! every tick together with the current instant and answers whether the
//! session must be recreated. When it answers yes it has already applied the
//! matching counter resets, so the caller only has to perform the reopen.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Thresholds that drive recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorPolicy {
    /// Reopen after this long without any usable reading.
    pub idle_threshold: Duration,
    /// Reopen after this many consecutive failing ticks.
    pub exc_threshold: u32,
    /// Unconditional reopen interval; `None` disables it.
    pub periodic_interval: Option<Duration>,
}

impl Default for SupervisorPolicy {
    fn default() -> Self {
        Self {
            idle_threshold: Duration::from_secs(300),
            exc_threshold: 5,
            periodic_interval: None,
        }
    }
}

/// Why the session is being recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReopenReason {
    Exceptions { count: u32 },
    Idle { idle: Duration, since_reopen: Duration },
    Periodic { idle: Duration, since_reopen: Duration },
}

impl fmt::Display for ReopenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReopenReason::Exceptions { count } => {
                write!(f, "consecutive exceptions={count}")
            }
            ReopenReason::Idle { idle, since_reopen } | ReopenReason::Periodic { idle, since_reopen } => {
                write!(
                    f,
                    "idle={}s, sinceReopen={}s",
                    idle.as_secs(),
                    since_reopen.as_secs()
                )
            }
        }
    }
}

/// Whole-second counters reported with every snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCounters {
    pub hb_tick: u64,
    pub idle_sec: u64,
    pub exc_count: u32,
    pub uptime_sec: u64,
    pub since_reopen_sec: u64,
}

#[derive(Debug, Clone)]
pub struct HealthSupervisor {
    policy: SupervisorPolicy,
    started_at: Instant,
    last_good_at: Instant,
    last_reopen_at: Instant,
    consecutive_exceptions: u32,
    tick: u64,
    reopen_count: u64,
}

impl HealthSupervisor {
    pub fn new(policy: SupervisorPolicy, now: Instant) -> Self {
        Self {
            policy,
            started_at: now,
            last_good_at: now,
            last_reopen_at: now,
            consecutive_exceptions: 0,
            tick: 0,
            reopen_count: 0,
        }
    }

    pub fn policy(&self) -> &SupervisorPolicy {
        &self.policy
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn consecutive_exceptions(&self) -> u32 {
        self.consecutive_exceptions
    }

    pub fn reopen_count(&self) -> u64 {
        self.reopen_count
    }

    pub fn idle(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_good_at)
    }

    pub fn since_reopen(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_reopen_at)
    }

    /// Counters as they stand right now.
    pub fn counters(&self, now: Instant) -> HealthCounters {
        HealthCounters {
            hb_tick: self.tick,
            idle_sec: self.idle(now).as_secs(),
            exc_count: self.consecutive_exceptions,
            uptime_sec: now.saturating_duration_since(self.started_at).as_secs(),
            since_reopen_sec: self.since_reopen(now).as_secs(),
        }
    }

    /// A tick produced at least one metric value.
    pub fn record_good(&mut self, now: Instant) {
        self.last_good_at = now;
    }

    /// A tick completed without a provider fault.
    pub fn record_success(&mut self) {
        self.consecutive_exceptions = 0;
    }

    /// A tick failed. Returns a reason when the failure streak hit the
    /// threshold; the streak is then cleared and the reopen time stamped.
    pub fn record_failure(&mut self, now: Instant) -> Option<ReopenReason> {
        self.consecutive_exceptions = self.consecutive_exceptions.saturating_add(1);
        if self.consecutive_exceptions < self.policy.exc_threshold.max(1) {
            return None;
        }
        let count = self.consecutive_exceptions;
        self.consecutive_exceptions = 0;
        self.last_reopen_at = now;
        self.reopen_count += 1;
        Some(ReopenReason::Exceptions { count })
    }

    /// Close the current tick and return the new tick number.
    pub fn advance_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Idle and periodic checks, run once after every tick. Both timers are
    /// reset when a reopen is requested.
    pub fn check_liveness(&mut self, now: Instant) -> Option<ReopenReason> {
        let idle = self.idle(now);
        let since_reopen = self.since_reopen(now);

        let reason = if idle >= self.policy.idle_threshold {
            ReopenReason::Idle { idle, since_reopen }
        } else {
            match self.policy.periodic_interval {
                Some(interval) if since_reopen >= interval => {
                    ReopenReason::Periodic { idle, since_reopen }
                }
                _ => return None,
            }
        };

        self.last_reopen_at = now;
        self.last_good_at = now;
        self.reopen_count += 1;
        Some(reason)
    }
}
