//! Sensor tree model shared by every provider and extractor.
//!
//! A provider exposes its hardware as a forest of [`SensorNode`]s. The tree is
//! only borrowed for the duration of a tick; extractors walk it with
//! [`walk`], an iterative depth-first traversal that also reports which root
//! each node belongs to.

use serde::{Deserialize, Serialize};

/// Category tag of a hardware node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareType {
    Cpu,
    Motherboard,
    SuperIo,
    EmbeddedController,
    Storage,
    GpuNvidia,
    GpuAmd,
    GpuIntel,
    Memory,
    Network,
    #[serde(other)]
    Other,
}

impl HardwareType {
    pub fn is_gpu(self) -> bool {
        matches!(
            self,
            HardwareType::GpuNvidia | HardwareType::GpuAmd | HardwareType::GpuIntel
        )
    }

    /// Motherboard, Super I/O chip or embedded controller.
    pub fn is_board(self) -> bool {
        matches!(
            self,
            HardwareType::Motherboard | HardwareType::SuperIo | HardwareType::EmbeddedController
        )
    }
}

/// Kind of a single sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Temperature,
    Load,
    Clock,
    Fan,
    Control,
    Power,
    Voltage,
    SmallData,
    Data,
    Factor,
    #[serde(other)]
    Other,
}

/// A (kind, name, optional value) triple. `value` is `None` when the provider
/// currently has no data for the sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub kind: SensorKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl SensorReading {
    pub fn new<S: Into<String>>(kind: SensorKind, name: S, value: Option<f64>) -> Self {
        Self {
            kind,
            name: name.into(),
            value,
        }
    }
}

/// One hardware component with its readings and sub-hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorNode {
    pub hardware_type: HardwareType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sensors: Vec<SensorReading>,
    #[serde(default)]
    pub children: Vec<SensorNode>,
}

impl SensorNode {
    pub fn new<S: Into<String>>(hardware_type: HardwareType, name: S) -> Self {
        Self {
            hardware_type,
            name: name.into(),
            sensors: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_sensor(mut self, kind: SensorKind, name: &str, value: Option<f64>) -> Self {
        self.sensors.push(SensorReading::new(kind, name, value));
        self
    }

    pub fn with_child(mut self, child: SensorNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A node reached during [`walk`], together with the root it hangs under.
#[derive(Debug, Clone, Copy)]
pub struct NodeVisit<'a> {
    pub root: &'a SensorNode,
    pub node: &'a SensorNode,
    pub depth: usize,
}

/// Iterative pre-order depth-first walk over a forest.
pub struct Walk<'a> {
    stack: Vec<NodeVisit<'a>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeVisit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        // Reverse so children come out in declaration order.
        for child in visit.node.children.iter().rev() {
            self.stack.push(NodeVisit {
                root: visit.root,
                node: child,
                depth: visit.depth + 1,
            });
        }
        Some(visit)
    }
}

/// Walk every node of the forest, roots first, in declaration order.
pub fn walk(roots: &[SensorNode]) -> Walk<'_> {
    let stack = roots
        .iter()
        .rev()
        .map(|root| NodeVisit {
            root,
            node: root,
            depth: 0,
        })
        .collect();
    Walk { stack }
}

/// Every reading in the forest with the visit that owns it.
pub fn readings(roots: &[SensorNode]) -> impl Iterator<Item = (NodeVisit<'_>, &SensorReading)> {
    walk(roots).flat_map(|visit| visit.node.sensors.iter().map(move |s| (visit, s)))
}

/// Readings under roots of the given category (the whole subtree counts).
pub fn readings_under<F>(
    roots: &[SensorNode],
    mut root_filter: F,
) -> impl Iterator<Item = (NodeVisit<'_>, &SensorReading)>
where
    F: FnMut(HardwareType) -> bool,
{
    let selected: Vec<&SensorNode> = roots
        .iter()
        .filter(|r| root_filter(r.hardware_type))
        .collect();
    selected
        .into_iter()
        .flat_map(|root| readings(std::slice::from_ref(root)))
}
