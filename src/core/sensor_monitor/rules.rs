//! Classification tables used by the extractors.
//!
//! Every heuristic is plain data here (keyword lists and numeric ranges) so
//! each rule can be tested on its own, independent of any sensor tree.

/// Numeric plausibility window. Values outside are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub inclusive: bool,
}

impl ValueRange {
    /// `min <= v <= max`
    pub const fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            inclusive: true,
        }
    }

    /// `min < v < max`
    pub const fn open(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            inclusive: false,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        if self.inclusive {
            value >= self.min && value <= self.max
        } else {
            value > self.min && value < self.max
        }
    }

    /// Returns the value only when it is plausible.
    pub fn accept(&self, value: f64) -> Option<f64> {
        self.contains(value).then_some(value)
    }
}

pub const TEMPERATURE_C: ValueRange = ValueRange::open(-50.0, 150.0);
/// Upper bound applied to the averaged motherboard temperature.
pub const MOTHERBOARD_MEAN_MAX_C: f64 = 120.0;
pub const FAN_RPM: ValueRange = ValueRange::closed(0.0, 10_000.0);
pub const PERCENT: ValueRange = ValueRange::closed(0.0, 100.0);
pub const BOARD_VOLTAGE_V: ValueRange = ValueRange::closed(0.1, 20.0);
pub const GPU_VOLTAGE_V: ValueRange = ValueRange::closed(0.2, 2.5);
pub const POWER_W: ValueRange = ValueRange::closed(0.0, 1_000.0);
pub const CPU_CLOCK_MHZ: ValueRange = ValueRange::open(10.0, 10_000.0);
pub const GPU_CLOCK_MHZ: ValueRange = ValueRange::open(10.0, 50_000.0);
pub const VRAM_USED_MB: ValueRange = ValueRange::closed(0.0, 100_000.0);

pub const MIB: f64 = 1024.0 * 1024.0;
/// VRAM readings above this are byte counts rather than megabytes.
pub const VRAM_BYTES_THRESHOLD: f64 = 8.0 * MIB;

/// Factor readings report boolean flags as 0/1.
pub const THROTTLE_FACTOR_THRESHOLD: f64 = 0.5;

/// Largest per-core index accepted from a sensor name.
pub const MAX_CORE_INDEX: usize = 1024;

/// Case-insensitive substring match. `name_lower` must already be lowercase.
pub fn mentions(name_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| name_lower.contains(k))
}

/// Allow/deny keyword pair. A name matches when it mentions at least one
/// allow keyword and no deny keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub allow: &'static [&'static str],
    pub deny: &'static [&'static str],
}

impl KeywordRule {
    pub const fn allow(allow: &'static [&'static str]) -> Self {
        Self { allow, deny: &[] }
    }

    pub fn matches(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        !lower.is_empty() && !mentions(&lower, self.deny) && mentions(&lower, self.allow)
    }
}

/// Ambient board temperatures preferred for the motherboard average.
pub const MOTHERBOARD_AMBIENT: KeywordRule = KeywordRule {
    allow: &[
        "motherboard",
        "mainboard",
        "system",
        "pch",
        "board",
        "ambient",
        "chassis",
        "ec",
    ],
    deny: &[
        "cpu", "core", "package", "gpu", "ssd", "nvme", "hdd", "vrm", "dimm", "memory",
    ],
};

/// Control sensors whose name marks them as a fan duty.
pub const FAN_CONTROL: KeywordRule = KeywordRule::allow(&["fan", "pwm", "duty", "cool"]);

pub const CPU_PACKAGE_POWER: KeywordRule = KeywordRule::allow(&["package", "cpu package", "pkg"]);
pub const CPU_CORE_CLOCK: KeywordRule = KeywordRule::allow(&["core", "effective", "p-core", "e-core"]);

/// Power readings that report an active power limit.
pub const POWER_LIMIT: KeywordRule = KeywordRule::allow(&["limit"]);
pub const THROTTLE_LOAD: KeywordRule = KeywordRule::allow(&["thrott"]);
pub const THROTTLE_FACTOR: KeywordRule = KeywordRule::allow(&[
    "thrott", "limit", "prochot", "pl1", "pl2", "edp", "tau", "thermal", "vr",
]);

pub const GPU_LOAD: KeywordRule = KeywordRule::allow(&["core", "gpu"]);
pub const GPU_CLOCK: KeywordRule = KeywordRule {
    allow: &["core", "graphics", "gpu"],
    deny: &["memory"],
};
/// Clocks never used as a GPU core clock fallback.
pub const GPU_NON_CORE_CLOCK: KeywordRule = KeywordRule::allow(&["memory", "mem"]);
pub const GPU_POWER: KeywordRule = KeywordRule::allow(&["package", "total", "board"]);
pub const GPU_VOLTAGE: KeywordRule = KeywordRule::allow(&["core", "vddc", "gfx"]);
pub const GPU_VRAM_SUBJECT: KeywordRule = KeywordRule::allow(&["vram", "memory"]);
pub const GPU_VRAM_MEASURE: KeywordRule = KeywordRule::allow(&["used", "usage", "util"]);
