//! # dlr-algo: Thermal Rating and Grid Stress Engine
//!
//! Weather-dependent line ratings and the analyses built on them.
//!
//! ## Pipeline
//!
//! | Step | Module | Output |
//! |------|--------|--------|
//! | Heat balance | [`thermal`] | ampacity per line (A) |
//! | Loading | [`stress`] | actual current, stress %, overload ambient |
//! | Aggregation | [`summary`] | band counts, mean/max stress, SSI |
//! | N-1 heuristic | [`contingency`] | ranked outages with overloaded neighbors |
//! | Manual outages | [`outage`] | adjusted stresses for a cut set |
//!
//! [`StressEngine`] wires these together for a [`dlr_core::Network`] and an
//! [`dlr_core::Environment`]. All computation is pure; only the N-1 screen fans
//! out across threads.
//!
//! ## Example
//!
//! ```
//! use dlr_algo::StressEngine;
//! use dlr_core::{Bus, Environment, Line, Network};
//!
//! let mut network = Network::new();
//! network.add_bus(Bus::new("A", 230.0)).unwrap();
//! network.add_bus(Bus::new("B", 230.0)).unwrap();
//! network
//!     .add_line(Line::new("AB", "A", "B").with_voltage(230.0).with_flow(150.0))
//!     .unwrap();
//!
//! let engine = StressEngine::default();
//! let report = engine.evaluate(&network, &Environment::new(30.0, 2.0, 270.0));
//! assert_eq!(report.lines.len(), 1);
//! assert!(report.lines[0].rating_a >= 100.0);
//! ```

pub mod config;
pub mod contingency;
pub mod engine;
pub mod outage;
pub mod region;
pub mod stress;
pub mod summary;
pub mod thermal;

pub use config::EngineConfig;
pub use contingency::{ContingencyConfig, ContingencyIssue, ContingencyReport, ContingencyResult};
pub use engine::{StressEngine, StressReport};
pub use outage::{AdjustedLine, OutageConfig, OutageSet, OutageView};
pub use region::{lines_in_region, Region};
pub use stress::{LineStress, OverloadSearch};
pub use summary::{BandEdges, StressBand, StressBands, SystemSummary};
pub use thermal::{ampacity, attack_angle, RatingInputs, ThermalParams};
