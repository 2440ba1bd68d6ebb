use parking_lot::Mutex;
use sensor_bridge::core::sensor_monitor::{
    HardwareCategories, HardwareSession, HardwareType, JsonLinesSink, MetricSnapshot,
    SensorHandle, SensorKind, SensorMonitor, SensorNode, SensorProvider, SnapshotEmitter,
    SnapshotSink,
};
use sensor_bridge::platform::FixtureProvider;
use sensor_bridge::{BridgeConfig, BridgeError, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy)]
enum Step {
    Good,
    Fail,
    Panic,
}

/// Provider whose refreshes follow a script shared across reopened handles.
#[derive(Clone, Default)]
struct ScriptedProvider {
    steps: Arc<Mutex<VecDeque<Step>>>,
    opens: Arc<AtomicUsize>,
    failing_opens: Arc<AtomicUsize>,
    panicking_opens: Arc<AtomicUsize>,
    update_delay: Duration,
}

impl ScriptedProvider {
    fn new(steps: &[Step]) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.iter().copied().collect())),
            ..Self::default()
        }
    }

    fn failing_first_opens(self, count: usize) -> Self {
        self.failing_opens.store(count, Ordering::SeqCst);
        self
    }

    fn panicking_first_opens(self, count: usize) -> Self {
        self.panicking_opens.store(count, Ordering::SeqCst);
        self
    }

    fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = delay;
        self
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

fn good_tree() -> Vec<SensorNode> {
    vec![SensorNode::new(HardwareType::Cpu, "Test CPU")
        .with_sensor(SensorKind::Temperature, "CPU Package", Some(55.0))
        .with_sensor(SensorKind::Load, "CPU Core #1", Some(20.0))]
}

struct ScriptedHandle {
    steps: Arc<Mutex<VecDeque<Step>>>,
    delay: Duration,
    tree: Vec<SensorNode>,
}

impl SensorHandle for ScriptedHandle {
    fn update(&mut self) -> Result<()> {
        std::thread::sleep(self.delay);
        let step = self.steps.lock().pop_front().unwrap_or(Step::Good);
        match step {
            Step::Good => {
                self.tree = good_tree();
                Ok(())
            }
            Step::Fail => Err(BridgeError::refresh("sensor chip timed out")),
            Step::Panic => panic!("driver exploded"),
        }
    }

    fn hardware(&self) -> &[SensorNode] {
        &self.tree
    }
}

impl SensorProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn open(&mut self, _categories: &HardwareCategories) -> Result<Box<dyn SensorHandle>> {
        let panics = self.panicking_opens.load(Ordering::SeqCst);
        if panics > 0 {
            self.panicking_opens.store(panics - 1, Ordering::SeqCst);
            panic!("driver init crashed");
        }
        let remaining = self.failing_opens.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_opens.store(remaining - 1, Ordering::SeqCst);
            return Err(BridgeError::provider_open("driver not loaded"));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedHandle {
            steps: Arc::clone(&self.steps),
            delay: self.update_delay,
            tree: Vec::new(),
        }))
    }
}

/// Sink that keeps every snapshot for inspection.
#[derive(Clone, Default)]
struct CaptureSink {
    snapshots: Arc<Mutex<Vec<MetricSnapshot>>>,
}

impl SnapshotSink for CaptureSink {
    fn write_snapshot(&mut self, snapshot: &MetricSnapshot) -> Result<()> {
        self.snapshots.lock().push(snapshot.clone());
        Ok(())
    }
}

struct FailingSink;

impl SnapshotSink for FailingSink {
    fn write_snapshot(&mut self, _snapshot: &MetricSnapshot) -> Result<()> {
        Err(BridgeError::output("stdout closed"))
    }
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn config(exc_threshold: u32, max_ticks: u64) -> BridgeConfig {
    BridgeConfig {
        exc_threshold,
        max_ticks: Some(max_ticks),
        summary_every_ticks: 0,
        ..BridgeConfig::default()
    }
}

fn monitor(
    provider: &ScriptedProvider,
    config: BridgeConfig,
) -> (SensorMonitor, Arc<Mutex<Vec<MetricSnapshot>>>) {
    let sink = CaptureSink::default();
    let snapshots = Arc::clone(&sink.snapshots);
    let session = HardwareSession::new(Box::new(provider.clone()));
    let emitter = SnapshotEmitter::new(Box::new(sink), false);
    let monitor = SensorMonitor::new(session, emitter, config).with_interval(Duration::ZERO);
    (monitor, snapshots)
}

#[test]
fn test_exception_threshold_reopens_and_resets_counter() {
    use Step::*;
    let provider = ScriptedProvider::new(&[Fail, Fail, Good, Fail, Fail, Fail, Good]);
    let (mut monitor, snapshots) = monitor(&provider, config(3, 7));

    let stats = monitor.run(&AtomicBool::new(false));

    assert_eq!(stats.ticks, 7);
    assert_eq!(stats.failed_ticks, 5);
    assert_eq!(stats.emitted, 2);
    assert_eq!(stats.reopens, 1);
    assert_eq!(provider.opens(), 2);

    let snapshots = snapshots.lock();
    // The failure streak is reported on the tick that ends it.
    assert_eq!(snapshots[0].counters.hb_tick, 2);
    assert_eq!(snapshots[0].counters.exc_count, 2);
    // The third failure triggered recovery, which cleared the streak.
    assert_eq!(snapshots[1].counters.hb_tick, 6);
    assert_eq!(snapshots[1].counters.exc_count, 0);
    assert_eq!(monitor.supervisor().consecutive_exceptions(), 0);
}

#[test]
fn test_failed_open_is_retried_by_exception_recovery() {
    let provider = ScriptedProvider::new(&[]).failing_first_opens(1);
    let (mut monitor, snapshots) = monitor(&provider, config(1, 2));

    let stats = monitor.run(&AtomicBool::new(false));

    assert_eq!(stats.failed_ticks, 1);
    assert_eq!(stats.emitted, 1);
    assert_eq!(stats.reopens, 1);
    assert_eq!(provider.opens(), 1);
    assert_eq!(snapshots.lock()[0].counters.hb_tick, 1);
}

#[test]
fn test_panicking_open_is_retried_like_a_failed_open() {
    // The first open panics at start-up, the second during recovery.
    let provider = ScriptedProvider::new(&[]).panicking_first_opens(2);
    let (mut monitor, snapshots) = monitor(&provider, config(1, 3));

    let stats = monitor.run(&AtomicBool::new(false));

    assert_eq!(stats.failed_ticks, 2);
    assert_eq!(stats.emitted, 1);
    assert_eq!(stats.reopens, 2);
    assert_eq!(provider.opens(), 1);
    assert_eq!(snapshots.lock()[0].counters.hb_tick, 2);
}

#[test]
fn test_good_data_is_stamped_after_a_slow_refresh() {
    let provider = ScriptedProvider::new(&[]).with_update_delay(Duration::from_millis(1100));
    let mut cfg = config(5, 2);
    cfg.idle_threshold_sec = 1;
    let (mut monitor, snapshots) = monitor(&provider, cfg);

    let stats = monitor.run(&AtomicBool::new(false));

    // The refresh itself outlasts the idle threshold; data arriving at its
    // end must not look stale.
    assert_eq!(stats.reopens, 0);
    assert_eq!(provider.opens(), 1);
    assert!(snapshots.lock().iter().all(|s| s.counters.idle_sec == 0));
}

#[test]
fn test_refresh_without_session_reports_not_open() {
    let provider = ScriptedProvider::new(&[]).failing_first_opens(1);
    let (mut monitor, _) = monitor(&provider, config(5, 1));

    monitor.ensure_open();
    assert!(!monitor.session().is_open());

    let report = monitor.run_tick();
    let error = report.error.unwrap_or_default();
    assert_eq!(error, BridgeError::SessionNotOpen.to_string());
}

#[test]
fn test_provider_panic_is_contained_in_the_tick() {
    let provider = ScriptedProvider::new(&[Step::Panic]);
    let (mut monitor, snapshots) = monitor(&provider, config(5, 2));
    monitor.ensure_open();

    let first = monitor.run_tick();
    assert!(first.error.unwrap_or_default().contains("driver exploded"));
    assert!(first.snapshot.is_none());
    assert_eq!(monitor.supervisor().consecutive_exceptions(), 1);

    let second = monitor.run_tick();
    assert!(second.error.is_none());
    assert_eq!(second.snapshot.map(|s| s.counters.exc_count), Some(1));
    assert_eq!(snapshots.lock().len(), 1);
}

#[test]
fn test_sink_failure_does_not_count_as_exception() {
    let provider = ScriptedProvider::new(&[]);
    let session = HardwareSession::new(Box::new(provider.clone()));
    let emitter = SnapshotEmitter::new(Box::new(FailingSink), false);
    let mut monitor =
        SensorMonitor::new(session, emitter, config(1, 3)).with_interval(Duration::ZERO);

    let stats = monitor.run(&AtomicBool::new(false));

    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.failed_ticks, 0);
    assert_eq!(stats.emitted, 0);
    assert_eq!(stats.reopens, 0);
    assert_eq!(provider.opens(), 1);
}

#[test]
fn test_idle_threshold_reopens_between_ticks() {
    let provider = ScriptedProvider::new(&[]);
    let mut cfg = config(5, 3);
    // Below the configurable minimum, so every between-tick check fires.
    cfg.idle_threshold_sec = 0;
    let (mut monitor, snapshots) = monitor(&provider, cfg);

    let stats = monitor.run(&AtomicBool::new(false));

    // The last tick ends the run before the liveness check.
    assert_eq!(stats.reopens, 2);
    assert_eq!(provider.opens(), 3);
    assert!(snapshots.lock().iter().all(|s| s.counters.idle_sec == 0));
}

#[test]
fn test_stop_flag_prevents_any_tick() {
    let provider = ScriptedProvider::new(&[]);
    let (mut monitor, snapshots) = monitor(&provider, config(5, 10));

    let stats = monitor.run(&AtomicBool::new(true));

    assert_eq!(stats.ticks, 0);
    assert!(snapshots.lock().is_empty());
    assert!(!monitor.session().is_open());
}

#[test]
fn test_fixture_run_writes_json_lines() {
    let fixture = NamedTempFile::new().unwrap();
    std::fs::write(
        fixture.path(),
        r#"[
          {"hardwareType": "Cpu", "name": "Intel Core i5",
           "sensors": [
             {"kind": "Temperature", "name": "Core #1", "value": 45.0},
             {"kind": "Temperature", "name": "CPU Package", "value": 62.0},
             {"kind": "Temperature", "name": "Core #2", "value": 999.0},
             {"kind": "Load", "name": "CPU Core #1", "value": 30.0},
             {"kind": "Load", "name": "CPU Core #3", "value": 50.0}
           ]},
          {"hardwareType": "Motherboard", "name": "Z790",
           "sensors": [
             {"kind": "Temperature", "name": "System", "value": 35.0},
             {"kind": "Temperature", "name": "VRM", "value": 70.0}
           ]},
          {"hardwareType": "Storage", "name": "Samsung 990",
           "sensors": [{"kind": "Temperature", "name": "Composite", "value": 41.0}]}
        ]"#,
    )
    .unwrap();

    let out = SharedBuf::default();
    let session = HardwareSession::new(Box::new(FixtureProvider::new(fixture.path())));
    let emitter = SnapshotEmitter::new(Box::new(JsonLinesSink::new(out.clone())), false);
    let mut monitor =
        SensorMonitor::new(session, emitter, config(5, 2)).with_interval(Duration::ZERO);

    let stats = monitor.run(&AtomicBool::new(false));
    assert_eq!(stats.emitted, 2);

    let text = String::from_utf8(out.0.lock().clone()).unwrap();
    let lines: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);

    let first = &lines[0];
    assert_eq!(first["cpuTempC"], 62.0);
    assert_eq!(first["moboTempC"], 35.0);
    assert_eq!(first["storageTemps"][0]["name"], "Samsung 990 Composite");
    assert_eq!(first["cpuCoreLoadsPct"], serde_json::json!([30.0, null, 50.0]));
    assert_eq!(first["hasTempValue"], true);
    assert_eq!(first["isAdmin"], false);
    assert_eq!(first["hbTick"], 0);
    assert!(first.get("gpus").is_none());
    assert_eq!(lines[1]["hbTick"], 1);
}
