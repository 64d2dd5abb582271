//! # dlr-io: Topology and Weather Collaborators
//!
//! Everything the engine needs from the outside world:
//!
//! - [`topology`]: grid CSVs (`buses.csv`, `lines.csv`) into a [`dlr_core::Network`]
//! - [`weather`]: observations from fixed values, JSON files or an HTTP forecast
//! - [`conductors`]: extra conductor types for the catalog
//! - [`cache`]: the TTL cache owned by the cached providers
//!
//! Unreadable sources surface as `TopologyUnavailable` / `WeatherUnavailable`;
//! bad individual rows are skipped and reported through
//! [`dlr_core::ImportDiagnostics`].
//!
//! ## Example
//!
//! ```
//! use dlr_io::topology::read_grid;
//!
//! let buses = "id,name,lat,lon,v_nom_kv\nA,,40.0,-105.0,230\nB,,40.0,-104.0,230\n";
//! let lines = "id,bus0,bus1,flow_mw\nAB,A,B,150\n";
//! let (network, diag) = read_grid(buses.as_bytes(), lines.as_bytes()).unwrap();
//! assert_eq!(network.line_count(), 1);
//! assert!(!diag.has_errors());
//! ```

pub mod builder;
pub mod cache;
pub mod conductors;
pub mod topology;
pub mod weather;

pub use cache::TtlCache;
pub use dlr_core::TopologyProvider;
pub use topology::{load_grid, read_grid, CachedTopology, CsvTopology};
pub use weather::{
    CachedWeather, JsonFileWeather, OpenMeteoWeather, StaticWeather, WeatherObservation,
    WeatherSource,
};
