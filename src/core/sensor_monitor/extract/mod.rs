//! Metric extraction over a refreshed sensor tree.
//!
//! One pure function per metric family. Extractors never fail: a reading that
//! is missing a value, has an unusable name or sits outside its plausibility
//! range is skipped on its own and the rest of the family still resolves.

mod board;
mod cpu;
mod fans;
mod flags;
mod gpu;
mod per_core;
mod storage;

pub use board::{board_voltages, motherboard_temperature};
pub use cpu::{cpu_package, cpu_temperature};
pub use fans::{fans, fans_raw, is_fan_like_control};
pub use flags::sensor_flags;
pub use gpu::gpus;
pub use per_core::{parse_core_index, per_core};
pub use storage::{map_storage_sensor_name, storage_temperatures, StorageLocation};

use super::metrics::ExtractedMetrics;
use super::tree::SensorNode;

/// Operator overrides that influence extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Report `cpuThrottleActive: false` even when no throttle-capable sensor exists.
    pub throttle_default_false: bool,
}

/// Run every extractor against the tree.
pub fn extract_all(roots: &[SensorNode], options: &ExtractOptions) -> ExtractedMetrics {
    ExtractedMetrics {
        cpu_temp_c: cpu_temperature(roots),
        mobo_temp_c: motherboard_temperature(roots),
        fans: fans(roots),
        fans_raw: fans_raw(roots),
        mobo_voltages: board_voltages(roots),
        storage_temps: storage_temperatures(roots),
        gpus: gpus(roots),
        cpu_package: cpu_package(roots, options),
        per_core: per_core(roots),
        flags: sensor_flags(roots),
    }
}

/// How a candidate slot combines successive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fold {
    Max,
    First,
}

fn fold_into(slot: &mut Option<f64>, value: f64, fold: Fold) {
    *slot = match (fold, *slot) {
        (_, None) => Some(value),
        (Fold::Max, Some(current)) => Some(current.max(value)),
        (Fold::First, Some(current)) => Some(current),
    };
}

/// Two-tier selection: readings whose name matches a preference rule win over
/// the rest; within each tier the fold decides.
#[derive(Debug, Clone)]
pub(crate) struct Preferred {
    preferred: Option<f64>,
    fallback: Option<f64>,
    preferred_fold: Fold,
    fallback_fold: Fold,
}

impl Preferred {
    pub(crate) fn new(preferred_fold: Fold, fallback_fold: Fold) -> Self {
        Self {
            preferred: None,
            fallback: None,
            preferred_fold,
            fallback_fold,
        }
    }

    pub(crate) fn offer(&mut self, value: f64, is_preferred: bool) {
        if is_preferred {
            fold_into(&mut self.preferred, value, self.preferred_fold);
        } else {
            fold_into(&mut self.fallback, value, self.fallback_fold);
        }
    }

    pub(crate) fn resolve(&self) -> Option<f64> {
        self.preferred.or(self.fallback)
    }
}

pub(crate) fn max_of<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values.into_iter().fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

pub(crate) fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub(crate) fn round_u32(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

pub(crate) fn non_empty(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
