//! Sensor acquisition and self-healing supervision.
//!
//! A [`HardwareSession`] owns the provider handle, the extractors turn the
//! refreshed tree into [`ExtractedMetrics`], the [`SnapshotEmitter`] writes one
//! record per tick and the [`HealthSupervisor`] decides when the session has to
//! be recreated. [`SensorMonitor`] wires them into the loop.

pub mod diagnostics;
pub mod extract;
mod metrics;
pub mod rules;
mod runtime;
mod session;
mod snapshot;
mod supervisor;
pub mod tree;

pub use diagnostics::{dump_sensor_tree, summary_line, StateChangeTracker};
pub use extract::{extract_all, ExtractOptions};
pub use metrics::{
    CpuPackageMetrics, ExtractedMetrics, FanReading, GpuReading, PerCoreMetrics, SensorFlags,
    StorageTemp, VoltageReading,
};
pub use runtime::{RunStats, SensorMonitor, TickReport};
pub use session::{HardwareCategories, HardwareSession, SensorHandle, SensorProvider};
pub use snapshot::{JsonLinesSink, MetricSnapshot, SnapshotEmitter, SnapshotSink};
pub use supervisor::{HealthCounters, HealthSupervisor, ReopenReason, SupervisorPolicy};
pub use tree::{HardwareType, SensorKind, SensorNode, SensorReading};
