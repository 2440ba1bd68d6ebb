//! Sensor provider backed by `sysinfo`.
//!
//! `sysinfo` reports temperatures as flat `Components` whose label starts with
//! the driver (hwmon chip) name, e.g. `coretemp Package id 0` or
//! `nvme Composite`. The provider groups them by chip into typed nodes and
//! adds a CPU node carrying per-core load and clock readings.

use std::collections::BTreeMap;

use sysinfo::{Components, CpuRefreshKind, System};

use super::nvidia_nvml::{nvidia_gpu_nodes, nvml_available};
use crate::core::sensor_monitor::{
    HardwareCategories, HardwareType, SensorHandle, SensorKind, SensorNode, SensorProvider,
    SensorReading,
};
use crate::error::Result;

/// One temperature component as reported by `sysinfo`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSample {
    pub label: String,
    pub temperature: Option<f32>,
}

/// CPU readings for one refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuSample {
    pub brand: String,
    pub total_load: f32,
    /// (load %, frequency MHz) per logical core, in OS order.
    pub cores: Vec<(f32, u64)>,
}

/// Hardware category for a hwmon / thermal-zone chip name.
pub fn classify_chip(chip: &str) -> HardwareType {
    let chip = chip.to_lowercase();
    let starts = |prefixes: &[&str]| prefixes.iter().any(|p| chip.starts_with(p));

    if starts(&["coretemp", "k10temp", "k8temp", "zenpower", "cpu_thermal", "cpu"]) {
        HardwareType::Cpu
    } else if starts(&["nvme", "drivetemp", "sata", "hdd", "ssd"]) {
        HardwareType::Storage
    } else if starts(&["amdgpu", "radeon"]) {
        HardwareType::GpuAmd
    } else if starts(&["nouveau", "nvidia"]) {
        HardwareType::GpuNvidia
    } else if starts(&["i915", "xe"]) {
        HardwareType::GpuIntel
    } else if starts(&["nct", "it87", "it86", "f71", "w83", "asus_wmi_sensors", "asus-ec"]) {
        HardwareType::SuperIo
    } else if starts(&["acpitz", "pch", "acpi"]) || chip.contains("thermalzone") {
        HardwareType::Motherboard
    } else if starts(&["thinkpad", "dell_smm", "hp", "applesmc", "asus"]) {
        HardwareType::EmbeddedController
    } else if starts(&["iwlwifi", "mt79", "r8169", "enp", "wl"]) {
        HardwareType::Network
    } else if starts(&["spd", "jc42", "dimm"]) {
        HardwareType::Memory
    } else {
        HardwareType::Other
    }
}

/// `coretemp` numbers cores from 0; the rest of the tree is 1-based.
fn cpu_sensor_name(name: &str) -> String {
    name.strip_prefix("Core ")
        .and_then(|n| n.trim().parse::<usize>().ok())
        .map(|n| format!("Core #{}", n + 1))
        .unwrap_or_else(|| name.to_string())
}

fn split_label(label: &str) -> (&str, &str) {
    let label = label.trim();
    match label.split_once(' ') {
        Some((chip, rest)) => (chip, rest.trim()),
        None => (label, ""),
    }
}

/// Assemble the sensor forest from raw samples.
pub fn build_tree(
    cpu: Option<&CpuSample>,
    components: &[ComponentSample],
    categories: &HardwareCategories,
) -> Vec<SensorNode> {
    let mut cpu_node = cpu.filter(|_| categories.cpu).map(|sample| {
        let mut node = SensorNode::new(HardwareType::Cpu, sample.brand.trim()).with_sensor(
            SensorKind::Load,
            "CPU Total",
            Some(f64::from(sample.total_load)),
        );
        for (i, (load, mhz)) in sample.cores.iter().enumerate() {
            let index = i + 1;
            node = node
                .with_sensor(
                    SensorKind::Load,
                    &format!("CPU Core #{index}"),
                    Some(f64::from(*load)),
                )
                .with_sensor(SensorKind::Clock, &format!("Core #{index}"), Some(*mhz as f64));
        }
        node
    });

    // Chips keep first-seen order.
    let mut order: Vec<String> = Vec::new();
    let mut chips: BTreeMap<String, SensorNode> = BTreeMap::new();

    for component in components {
        let (chip, name) = split_label(&component.label);
        let hardware_type = classify_chip(chip);
        if !categories.includes(hardware_type) {
            continue;
        }
        let value = component.temperature.map(f64::from);
        let name = if name.is_empty() { "Temperature" } else { name };

        if hardware_type == HardwareType::Cpu {
            let node = cpu_node.get_or_insert_with(|| SensorNode::new(HardwareType::Cpu, chip));
            node.sensors.push(SensorReading::new(
                SensorKind::Temperature,
                cpu_sensor_name(name),
                value,
            ));
            continue;
        }

        let node = chips.entry(chip.to_string()).or_insert_with(|| {
            order.push(chip.to_string());
            SensorNode::new(hardware_type, chip)
        });
        node.sensors.push(SensorReading::new(
            SensorKind::Temperature,
            name,
            value,
        ));
    }

    let mut roots: Vec<SensorNode> = cpu_node.into_iter().collect();
    roots.extend(order.iter().filter_map(|chip| chips.remove(chip)));
    roots
}

/// Opens [`SysinfoHandle`]s. NVIDIA GPUs are added through NVML when the
/// `nvml` feature is enabled and a driver is present.
#[derive(Debug, Default)]
pub struct SysinfoProvider;

impl SysinfoProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SensorProvider for SysinfoProvider {
    fn name(&self) -> &str {
        "sysinfo"
    }

    fn open(&mut self, categories: &HardwareCategories) -> Result<Box<dyn SensorHandle>> {
        let mut system = System::new();
        system.refresh_cpu_specifics(CpuRefreshKind::everything());
        let components = Components::new_with_refreshed_list();
        let use_nvml = categories.gpu && nvml_available();
        log::debug!(
            "sysinfo provider: {} cpus, {} components, nvml={}",
            system.cpus().len(),
            components.list().len(),
            use_nvml
        );

        Ok(Box::new(SysinfoHandle {
            system,
            components,
            categories: *categories,
            use_nvml,
            tree: Vec::new(),
        }))
    }
}

pub struct SysinfoHandle {
    system: System,
    components: Components,
    categories: HardwareCategories,
    use_nvml: bool,
    tree: Vec<SensorNode>,
}

impl SensorHandle for SysinfoHandle {
    fn update(&mut self) -> Result<()> {
        self.system.refresh_cpu_specifics(CpuRefreshKind::everything());
        self.components.refresh(true);

        let cpus = self.system.cpus();
        let cpu = (!cpus.is_empty()).then(|| CpuSample {
            brand: cpus[0].brand().to_string(),
            total_load: self.system.global_cpu_usage(),
            cores: cpus.iter().map(|c| (c.cpu_usage(), c.frequency())).collect(),
        });
        let components: Vec<ComponentSample> = self
            .components
            .list()
            .iter()
            .map(|c| ComponentSample {
                label: c.label().to_string(),
                temperature: c.temperature(),
            })
            .collect();

        let mut tree = build_tree(cpu.as_ref(), &components, &self.categories);
        if self.use_nvml {
            tree.extend(nvidia_gpu_nodes());
        }
        self.tree = tree;
        Ok(())
    }

    fn hardware(&self) -> &[SensorNode] {
        &self.tree
    }
}
