//! # dlr-core: Transmission Grid Model for Dynamic Line Rating
//!
//! Data structures shared by the rating engine, the loaders and the CLI.
//!
//! ## Design Philosophy
//!
//! The grid is an **undirected multigraph**:
//! - **Nodes**: [`Bus`] (substations / line terminals)
//! - **Edges**: [`Line`] (overhead transmission circuits)
//!
//! Adjacency ("which lines share a bus") is the only topology the engine needs,
//! both for the N-1 heuristic and for outage propagation, so it is answered from
//! the graph rather than from line names.
//!
//! ## Quick Start
//!
//! ```rust
//! use dlr_core::*;
//!
//! let mut network = Network::new();
//! network.add_bus(Bus::new("A", 138.0)).unwrap();
//! network.add_bus(Bus::new("B", 138.0)).unwrap();
//! network.add_bus(Bus::new("C", 138.0)).unwrap();
//!
//! network.add_line(Line::new("L1", "A", "B").with_flow(80.0)).unwrap();
//! network.add_line(Line::new("L2", "B", "C").with_flow(40.0)).unwrap();
//!
//! let neighbors = network.neighbor_lines(&LineId::new("L1"));
//! assert_eq!(neighbors.len(), 1);
//! assert_eq!(network.bus_degree(&BusId::new("B")), 2);
//! ```
//!
//! ## Modules
//!
//! - [`conductor`] - Conductor reference data and catalog lookup
//! - [`environment`] - Weather/loading input for one computation
//! - [`diagnostics`] - Per-record issue collection
//! - [`geo`] - Bearings and point-in-polygon
//! - [`graph_utils`] - Topological analysis (connectivity, islands)
//! - [`provider`] - The [`TopologyProvider`] trait implemented by loaders

use std::collections::HashMap;
use std::fmt;

use petgraph::{prelude::*, Undirected};
use serde::{Deserialize, Serialize};

pub mod conductor;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod geo;
pub mod graph_utils;
pub mod provider;
pub mod units;

pub use conductor::{Conductor, ConductorCatalog, ResolvedConductor, DEFAULT_CONDUCTOR};
pub use diagnostics::{DiagnosticIssue, Diagnostics, ImportDiagnostics, ImportStats, Severity};
pub use environment::{Environment, LoadScenario};
pub use error::{DlrError, DlrResult};
pub use geo::{point_in_polygon, polyline_azimuth, GeoPoint};
pub use graph_utils::*;
pub use petgraph::graph::{EdgeIndex, NodeIndex};
pub use provider::TopologyProvider;
pub use units::{
    Amperes, Celsius, Degrees, Kilovolts, MegavoltAmperes, Megawatts, MetersPerSecond, Radians,
};

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(String);
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl BusId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        BusId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl LineId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        LineId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    pub position: GeoPoint,
    /// Nominal voltage (kV)
    pub voltage: Kilovolts,
}

impl Bus {
    pub fn new(id: impl Into<String>, voltage_kv: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: BusId(id),
            position: GeoPoint::default(),
            voltage: Kilovolts(voltage_kv),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, lat: f64, lon: f64) -> Self {
        self.position = GeoPoint::new(lat, lon);
        self
    }
}

/// An overhead transmission circuit between two buses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    /// Display name; never parsed for topology
    pub name: String,
    pub bus0: BusId,
    pub bus1: BusId,
    /// Conductor type as given by the source data, resolved against the catalog at rating time
    pub conductor: String,
    pub s_nom: MegavoltAmperes,
    /// Maximum operating temperature
    pub mot: Celsius,
    /// Nominal (base case) active power flow, signed
    pub flow: Megawatts,
    pub voltage: Kilovolts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometry: Vec<GeoPoint>,
    /// Compass bearing of the line, `[0, 360)`
    pub azimuth: Degrees,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            id: LineId::new(""),
            name: String::new(),
            bus0: BusId::new(""),
            bus1: BusId::new(""),
            conductor: DEFAULT_CONDUCTOR.to_string(),
            s_nom: MegavoltAmperes(0.0),
            mot: Celsius(100.0),
            flow: Megawatts(0.0),
            voltage: Kilovolts(0.0),
            geometry: Vec::new(),
            azimuth: Degrees(0.0),
        }
    }
}

impl Line {
    pub fn new(id: impl Into<String>, bus0: impl Into<String>, bus1: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: LineId(id),
            bus0: BusId(bus0.into()),
            bus1: BusId(bus1.into()),
            ..Line::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_conductor(mut self, conductor: impl Into<String>) -> Self {
        self.conductor = conductor.into();
        self
    }

    pub fn with_flow(mut self, flow_mw: f64) -> Self {
        self.flow = Megawatts(flow_mw);
        self
    }

    pub fn with_mot(mut self, mot_c: f64) -> Self {
        self.mot = Celsius(mot_c);
        self
    }

    pub fn with_voltage(mut self, kv: f64) -> Self {
        self.voltage = Kilovolts(kv);
        self
    }

    pub fn with_s_nom(mut self, mva: f64) -> Self {
        self.s_nom = MegavoltAmperes(mva);
        self
    }

    pub fn with_azimuth(mut self, degrees: f64) -> Self {
        self.azimuth = Degrees(degrees).normalized();
        self
    }

    /// Set the geometry and derive the azimuth from it (0° when it has no extent).
    pub fn with_geometry(mut self, geometry: Vec<GeoPoint>) -> Self {
        self.azimuth = polyline_azimuth(&geometry).unwrap_or(Degrees(0.0));
        self.geometry = geometry;
        self
    }

    /// True when `bus` is one of the line's terminals.
    pub fn touches(&self, bus: &BusId) -> bool {
        &self.bus0 == bus || &self.bus1 == bus
    }
}

/// Aggregate network statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkStats {
    pub num_buses: usize,
    pub num_lines: usize,
    pub total_abs_flow_mw: f64,
    /// Distinct nominal line voltages, ascending
    pub voltage_levels_kv: Vec<f64>,
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels: Vec<String> = self
            .voltage_levels_kv
            .iter()
            .map(|kv| format!("{kv}"))
            .collect();
        write!(
            f,
            "{} buses, {} lines, {:.1} MW total |flow|, voltage levels [{}] kV",
            self.num_buses,
            self.num_lines,
            self.total_abs_flow_mw,
            levels.join(", ")
        )
    }
}

/// The transmission network graph
#[derive(Debug, Clone)]
pub struct Network {
    pub graph: Graph<Bus, Line, Undirected>,
    bus_index: HashMap<BusId, NodeIndex>,
    line_index: HashMap<LineId, EdgeIndex>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            graph: Graph::new_undirected(),
            bus_index: HashMap::new(),
            line_index: HashMap::new(),
        }
    }

    /// Add a bus. Bus ids must be unique.
    pub fn add_bus(&mut self, bus: Bus) -> DlrResult<NodeIndex> {
        if self.bus_index.contains_key(&bus.id) {
            return Err(DlrError::Network(format!("duplicate bus id '{}'", bus.id)));
        }
        let id = bus.id.clone();
        let idx = self.graph.add_node(bus);
        self.bus_index.insert(id, idx);
        Ok(idx)
    }

    /// Add a line between two existing buses. Line ids must be unique.
    pub fn add_line(&mut self, line: Line) -> DlrResult<EdgeIndex> {
        if self.line_index.contains_key(&line.id) {
            return Err(DlrError::Network(format!("duplicate line id '{}'", line.id)));
        }
        let from = self.node_of(&line.bus0).ok_or_else(|| {
            DlrError::Network(format!("line '{}' references unknown bus '{}'", line.id, line.bus0))
        })?;
        let to = self.node_of(&line.bus1).ok_or_else(|| {
            DlrError::Network(format!("line '{}' references unknown bus '{}'", line.id, line.bus1))
        })?;
        let id = line.id.clone();
        let idx = self.graph.add_edge(from, to, line);
        self.line_index.insert(id, idx);
        Ok(idx)
    }

    pub fn node_of(&self, id: &BusId) -> Option<NodeIndex> {
        self.bus_index.get(id).copied()
    }

    pub fn edge_of(&self, id: &LineId) -> Option<EdgeIndex> {
        self.line_index.get(id).copied()
    }

    pub fn bus(&self, id: &BusId) -> Option<&Bus> {
        self.node_of(id).map(|idx| &self.graph[idx])
    }

    pub fn line(&self, id: &LineId) -> Option<&Line> {
        self.edge_of(id).map(|idx| &self.graph[idx])
    }

    pub fn contains_line(&self, id: &LineId) -> bool {
        self.line_index.contains_key(id)
    }

    /// Buses in insertion order.
    pub fn buses(&self) -> impl Iterator<Item = &Bus> {
        self.graph.node_weights()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.graph.edge_weights()
    }

    pub fn bus_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn line_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of line ends terminating at the bus (0 for unknown buses).
    pub fn bus_degree(&self, id: &BusId) -> usize {
        self.node_of(id)
            .map(|idx| self.graph.edges(idx).count())
            .unwrap_or(0)
    }

    /// Lines terminating at a bus.
    pub fn incident_lines(&self, id: &BusId) -> Vec<&Line> {
        match self.node_of(id) {
            Some(idx) => self.graph.edges(idx).map(|edge| edge.weight()).collect(),
            None => Vec::new(),
        }
    }

    /// Other lines sharing either endpoint bus with `id`.
    ///
    /// Each neighbor appears once even when it shares both buses (a parallel
    /// circuit). Returned in insertion order.
    pub fn neighbor_lines(&self, id: &LineId) -> Vec<&Line> {
        let Some(edge) = self.edge_of(id) else {
            return Vec::new();
        };
        let Some((a, b)) = self.graph.edge_endpoints(edge) else {
            return Vec::new();
        };
        let mut found: Vec<EdgeIndex> = self
            .graph
            .edges(a)
            .chain(self.graph.edges(b))
            .map(|e| e.id())
            .filter(|&other| other != edge)
            .collect();
        found.sort_unstable();
        found.dedup();
        found.into_iter().map(|idx| &self.graph[idx]).collect()
    }

    /// Compute basic statistics about the network
    pub fn stats(&self) -> NetworkStats {
        let mut levels: Vec<f64> = Vec::new();
        let mut total_abs_flow_mw = 0.0;
        for line in self.lines() {
            total_abs_flow_mw += line.flow.value().abs();
            let kv = line.voltage.value();
            if kv > 0.0 && !levels.iter().any(|l| (l - kv).abs() < 1e-9) {
                levels.push(kv);
            }
        }
        levels.sort_by(|a, b| a.total_cmp(b));
        NetworkStats {
            num_buses: self.bus_count(),
            num_lines: self.line_count(),
            total_abs_flow_mw,
            voltage_levels_kv: levels,
        }
    }

    /// Validate network data for issues that make ratings meaningless.
    ///
    /// Populates the provided `Diagnostics` with any warnings/errors found.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        if self.bus_count() == 0 {
            diag.add_error("structure", "Network has no buses");
            return;
        }
        if self.line_count() == 0 {
            diag.add_warning("structure", "Network has no lines");
        }

        for line in self.lines() {
            let entity = format!("Line {}", line.id);
            let kv = line.voltage.value();
            if !(kv.is_finite() && kv > 0.0) {
                diag.add_warning_with_entity(
                    "numeric",
                    "no voltage level; current and stress evaluate to zero",
                    &entity,
                );
            }
            if !line.flow.is_finite() {
                diag.add_warning_with_entity("numeric", "flow is not finite", &entity);
            }
            if !line.mot.is_finite() {
                diag.add_warning_with_entity("numeric", "MOT is not finite", &entity);
            }
            if line.bus0 == line.bus1 {
                diag.add_warning_with_entity("structure", "line starts and ends at the same bus", &entity);
            }
        }

        let isolated = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph.edges(idx).next().is_none())
            .count();
        if isolated > 0 && self.line_count() > 0 {
            diag.add_warning(
                "structure",
                &format!("{} bus(es) have no connected lines", isolated),
            );
        }
    }

    /// Validate and return diagnostics.
    pub fn validate(&self) -> Diagnostics {
        let mut diag = Diagnostics::new();
        self.validate_into(&mut diag);
        diag
    }
}
