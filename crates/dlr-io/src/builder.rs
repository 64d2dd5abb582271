//! Format-agnostic construction of a [`dlr_core::Network`].
//!
//! Loaders convert their rows into [`BusInput`] / [`LineInput`] and let the
//! builder apply the shared defaulting rules and bookkeeping:
//!
//! - a line without a positive voltage inherits its `bus0` nominal voltage
//! - an explicit azimuth wins over one derived from geometry; neither gives 0°
//! - a missing MOT or conductor falls back to a documented default
//! - lines referencing unknown buses, and duplicate ids, are skipped
//!
//! # Example
//! ```
//! use dlr_core::ImportDiagnostics;
//! use dlr_io::builder::{BusInput, LineInput, NetworkBuilder};
//!
//! let mut diag = ImportDiagnostics::new();
//! let mut builder = NetworkBuilder::with_diagnostics(&mut diag);
//! builder.add_bus(BusInput::new("A", 230.0));
//! builder.add_bus(BusInput::new("B", 230.0));
//! builder.add_line(LineInput::new("L1", "A", "B", 120.0), 2);
//! let network = builder.build();
//! assert_eq!(network.line_count(), 1);
//! assert_eq!(diag.stats.lines, 1);
//! ```

use dlr_core::{
    Bus, BusId, Degrees, GeoPoint, ImportDiagnostics, Line, Network, DEFAULT_CONDUCTOR,
};

/// MOT assumed when the source omits it (°C).
pub const DEFAULT_MOT_C: f64 = 100.0;

/// Generic input data for bus creation
#[derive(Debug, Clone, Default)]
pub struct BusInput {
    pub id: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub voltage_kv: f64,
}

impl BusInput {
    pub fn new(id: impl Into<String>, voltage_kv: f64) -> Self {
        Self {
            id: id.into(),
            voltage_kv,
            ..Self::default()
        }
    }
}

/// Generic input data for line creation
#[derive(Debug, Clone, Default)]
pub struct LineInput {
    pub id: String,
    pub name: Option<String>,
    pub bus0: String,
    pub bus1: String,
    pub conductor: Option<String>,
    pub s_nom_mva: Option<f64>,
    pub mot_c: Option<f64>,
    pub flow_mw: f64,
    pub voltage_kv: Option<f64>,
    pub azimuth_deg: Option<f64>,
    pub geometry: Vec<GeoPoint>,
}

impl LineInput {
    pub fn new(
        id: impl Into<String>,
        bus0: impl Into<String>,
        bus1: impl Into<String>,
        flow_mw: f64,
    ) -> Self {
        Self {
            id: id.into(),
            bus0: bus0.into(),
            bus1: bus1.into(),
            flow_mw,
            ..Self::default()
        }
    }
}

/// Result of adding an element to the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddResult {
    /// Element was successfully added
    Added,
    /// Element was skipped (e.g., references unknown bus)
    Skipped,
}

/// Builder for constructing Network from generic inputs, with optional
/// diagnostics tracking.
pub struct NetworkBuilder<'a> {
    network: Network,
    diag: Option<&'a mut ImportDiagnostics>,
}

impl Default for NetworkBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> NetworkBuilder<'a> {
    /// Create a new NetworkBuilder without diagnostics
    pub fn new() -> Self {
        Self {
            network: Network::new(),
            diag: None,
        }
    }

    /// Create a new NetworkBuilder with diagnostics tracking
    pub fn with_diagnostics(diag: &'a mut ImportDiagnostics) -> Self {
        Self {
            network: Network::new(),
            diag: Some(diag),
        }
    }

    /// Record a source row that produced no element.
    pub fn skip_row(&mut self, category: &str, message: &str, row: usize) -> AddResult {
        tracing::warn!(row, category, "{message}; row skipped");
        if let Some(diag) = self.diag.as_deref_mut() {
            diag.add_skipped_row(category, message, row);
        }
        AddResult::Skipped
    }

    /// Record a non-fatal problem with an element that was still added.
    pub fn warn_entity(&mut self, category: &str, message: &str, entity: &str) {
        if let Some(diag) = self.diag.as_deref_mut() {
            diag.add_warning_with_entity(category, message, entity);
        }
    }

    fn defaulted(&mut self, category: &str, message: &str, entity: &str) {
        tracing::debug!(entity, "{message}");
        if let Some(diag) = self.diag.as_deref_mut() {
            diag.add_defaulted(category, message, entity);
        }
    }

    /// Check if a bus exists in the network
    pub fn has_bus(&self, id: &str) -> bool {
        self.network.bus(&BusId::new(id)).is_some()
    }

    /// Add a bus; `row` is the source row used in diagnostics.
    pub fn add_bus_at(&mut self, input: BusInput, row: usize) -> AddResult {
        let id = input.id.trim().to_string();
        if id.is_empty() {
            return self.skip_row("parse", "bus id is empty", row);
        }
        let mut bus = Bus::new(id.clone(), input.voltage_kv).with_position(input.lat, input.lon);
        if let Some(name) = input.name.filter(|n| !n.trim().is_empty()) {
            bus = bus.with_name(name);
        }
        if !bus.position.is_valid() {
            self.warn_entity("geometry", "bus position outside WGS84 range", &format!("Bus {id}"));
        }
        match self.network.add_bus(bus) {
            Ok(_) => {
                if let Some(diag) = self.diag.as_deref_mut() {
                    diag.stats.buses += 1;
                }
                AddResult::Added
            }
            Err(err) => self.skip_row("reference", &err.to_string(), row),
        }
    }

    pub fn add_bus(&mut self, input: BusInput) -> AddResult {
        let row = self.network.bus_count() + 1;
        self.add_bus_at(input, row)
    }

    /// Add a line between previously added buses; `row` is the source row used
    /// in diagnostics.
    pub fn add_line(&mut self, input: LineInput, row: usize) -> AddResult {
        let id = input.id.trim().to_string();
        if id.is_empty() {
            return self.skip_row("parse", "line id is empty", row);
        }
        let entity = format!("Line {id}");

        let bus0 = input.bus0.trim().to_string();
        let bus1 = input.bus1.trim().to_string();
        let Some(bus0_kv) = self.network.bus(&BusId::new(&bus0)).map(|b| b.voltage.value()) else {
            return self.skip_row("reference", &format!("{entity} references unknown bus '{bus0}'"), row);
        };
        if !self.has_bus(&bus1) {
            return self.skip_row("reference", &format!("{entity} references unknown bus '{bus1}'"), row);
        }

        let voltage_kv = match input.voltage_kv.filter(|kv| kv.is_finite() && *kv > 0.0) {
            Some(kv) => kv,
            None => {
                self.defaulted(
                    "voltage",
                    &format!("no line voltage, using bus {bus0} ({bus0_kv} kV)"),
                    &entity,
                );
                bus0_kv
            }
        };
        let mot_c = match input.mot_c {
            Some(mot) => mot,
            None => {
                self.defaulted("mot", &format!("no MOT, using {DEFAULT_MOT_C} °C"), &entity);
                DEFAULT_MOT_C
            }
        };
        let conductor = match input.conductor.filter(|c| !c.trim().is_empty()) {
            Some(conductor) => conductor,
            None => {
                self.defaulted(
                    "conductor",
                    &format!("no conductor, using {DEFAULT_CONDUCTOR}"),
                    &entity,
                );
                DEFAULT_CONDUCTOR.to_string()
            }
        };

        let mut line = Line::new(id, bus0, bus1)
            .with_conductor(conductor)
            .with_flow(input.flow_mw)
            .with_mot(mot_c)
            .with_voltage(voltage_kv)
            .with_s_nom(input.s_nom_mva.unwrap_or(0.0))
            .with_geometry(input.geometry);
        if let Some(name) = input.name.filter(|n| !n.trim().is_empty()) {
            line = line.with_name(name);
        }
        if let Some(azimuth) = input.azimuth_deg.filter(|a| a.is_finite()) {
            line.azimuth = Degrees(azimuth).normalized();
        }

        match self.network.add_line(line) {
            Ok(_) => {
                if let Some(diag) = self.diag.as_deref_mut() {
                    diag.stats.lines += 1;
                }
                AddResult::Added
            }
            Err(err) => self.skip_row("reference", &err.to_string(), row),
        }
    }

    pub fn build(self) -> Network {
        self.network
    }
}
