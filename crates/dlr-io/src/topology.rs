//! Grid topology from CSV.
//!
//! A grid directory holds two files:
//!
//! ```text
//! buses.csv  id,name,lat,lon,v_nom_kv
//! lines.csv  id,name,bus0,bus1,conductor,s_nom_mva,mot_c,flow_mw,v_kv,azimuth_deg,geometry
//! ```
//!
//! `name`, `conductor`, `s_nom_mva`, `mot_c`, `v_kv`, `azimuth_deg` and
//! `geometry` may be empty or absent. `geometry` is WKT,
//! `LINESTRING(lon lat, lon lat, ...)`.
//!
//! A row that cannot be used is skipped and recorded in [`ImportDiagnostics`];
//! the rest of the file still loads. A file that cannot be opened at all makes
//! the topology unavailable.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use csv::ReaderBuilder;
use dlr_core::{DlrError, DlrResult, GeoPoint, ImportDiagnostics, Network, TopologyProvider};
use serde::Deserialize;
use tracing::{info, warn};

use crate::builder::{BusInput, LineInput, NetworkBuilder};
use crate::cache::TtlCache;

pub const BUSES_FILE: &str = "buses.csv";
pub const LINES_FILE: &str = "lines.csv";

#[derive(Debug, Deserialize)]
struct BusRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    lat: f64,
    lon: f64,
    v_nom_kv: f64,
}

#[derive(Debug, Deserialize)]
struct LineRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    bus0: String,
    bus1: String,
    #[serde(default)]
    conductor: Option<String>,
    #[serde(default)]
    s_nom_mva: Option<f64>,
    #[serde(default)]
    mot_c: Option<f64>,
    flow_mw: f64,
    #[serde(default)]
    v_kv: Option<f64>,
    #[serde(default)]
    azimuth_deg: Option<f64>,
    #[serde(default)]
    geometry: Option<String>,
}

/// Parse a WKT `LINESTRING(lon lat, ...)` into points.
///
/// `LINESTRING EMPTY` yields no points. Coordinates beyond the first two of a
/// vertex (Z/M) are ignored.
pub fn parse_linestring(wkt: &str) -> Result<Vec<GeoPoint>, String> {
    let text = wkt.trim();
    let upper = text.to_ascii_uppercase();
    let Some(rest) = upper.strip_prefix("LINESTRING") else {
        return Err(format!("expected LINESTRING, got '{}'", truncate(text)));
    };
    let rest = rest.trim_start();
    let rest = rest
        .strip_prefix('Z')
        .or_else(|| rest.strip_prefix('M'))
        .unwrap_or(rest)
        .trim_start();
    if rest == "EMPTY" {
        return Ok(Vec::new());
    }
    let body = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| format!("unbalanced parentheses in '{}'", truncate(text)))?;

    body.split(',')
        .map(|vertex| {
            let mut parts = vertex.split_whitespace();
            let lon = parts.next().map(str::parse::<f64>);
            let lat = parts.next().map(str::parse::<f64>);
            match (lon, lat) {
                (Some(Ok(lon)), Some(Ok(lat))) => Ok(GeoPoint::new(lat, lon)),
                _ => Err(format!("bad vertex '{}'", vertex.trim())),
            }
        })
        .collect()
}

fn truncate(text: &str) -> String {
    text.chars().take(40).collect()
}

/// Load buses and lines from two CSV readers.
///
/// Row numbers in diagnostics are 1-based file lines (the header is line 1).
pub fn read_grid<B: Read, L: Read>(buses: B, lines: L) -> DlrResult<(Network, ImportDiagnostics)> {
    let mut diag = ImportDiagnostics::new();
    let mut builder = NetworkBuilder::with_diagnostics(&mut diag);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(buses);
    for (idx, result) in rdr.deserialize::<BusRecord>().enumerate() {
        let row = idx + 2;
        match result {
            Ok(record) => {
                builder.add_bus_at(
                    BusInput {
                        id: record.id,
                        name: record.name,
                        lat: record.lat,
                        lon: record.lon,
                        voltage_kv: record.v_nom_kv,
                    },
                    row,
                );
            }
            Err(err) => skip_bad_row(&mut builder, "buses", &err, row),
        }
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(lines);
    for (idx, result) in rdr.deserialize::<LineRecord>().enumerate() {
        let row = idx + 2;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                skip_bad_row(&mut builder, "lines", &err, row);
                continue;
            }
        };
        let geometry = match record.geometry.as_deref().filter(|g| !g.is_empty()) {
            None => Vec::new(),
            Some(wkt) => match parse_linestring(wkt) {
                Ok(points) => points,
                Err(msg) => {
                    warn!(line = %record.id, "ignoring geometry: {msg}");
                    builder.warn_entity("geometry", &msg, &format!("Line {}", record.id));
                    Vec::new()
                }
            },
        };
        builder.add_line(
            LineInput {
                id: record.id,
                name: record.name,
                bus0: record.bus0,
                bus1: record.bus1,
                conductor: record.conductor,
                s_nom_mva: record.s_nom_mva,
                mot_c: record.mot_c,
                flow_mw: record.flow_mw,
                voltage_kv: record.v_kv,
                azimuth_deg: record.azimuth_deg,
                geometry,
            },
            row,
        );
    }

    let network = builder.build();
    Ok((network, diag))
}

fn skip_bad_row(builder: &mut NetworkBuilder<'_>, file: &str, err: &csv::Error, row: usize) {
    builder.skip_row("parse", &format!("{file}: {err}"), row);
}

fn open(path: &Path) -> DlrResult<std::fs::File> {
    std::fs::File::open(path)
        .map_err(|err| DlrError::TopologyUnavailable(format!("{}: {}", path.display(), err)))
}

/// Load `buses.csv` and `lines.csv` from explicit paths.
pub fn load_grid_files(buses: &Path, lines: &Path) -> DlrResult<(Network, ImportDiagnostics)> {
    let (network, diag) = read_grid(open(buses)?, open(lines)?)?;
    if diag.has_errors() {
        warn!("{}", diag.summary());
    } else {
        info!("{}", diag.summary());
    }
    Ok((network, diag))
}

/// Load a grid directory containing `buses.csv` and `lines.csv`.
pub fn load_grid(dir: &Path) -> DlrResult<(Network, ImportDiagnostics)> {
    load_grid_files(&dir.join(BUSES_FILE), &dir.join(LINES_FILE))
}

/// Topology read from a grid directory on every call.
#[derive(Debug, Clone)]
pub struct CsvTopology {
    dir: PathBuf,
}

impl CsvTopology {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load and keep the import diagnostics.
    pub fn load_with_diagnostics(&self) -> DlrResult<(Network, ImportDiagnostics)> {
        load_grid(&self.dir)
    }
}

impl TopologyProvider for CsvTopology {
    fn load(&self) -> DlrResult<Network> {
        let (network, _) = load_grid(&self.dir)?;
        if network.line_count() == 0 {
            return Err(DlrError::TopologyUnavailable(format!(
                "{}: no usable lines",
                self.dir.display()
            )));
        }
        Ok(network)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.dir.display())
    }
}

/// Topology provider that reuses the last successful load for a while.
pub struct CachedTopology<P> {
    inner: P,
    cache: TtlCache<(), Network>,
}

impl<P: TopologyProvider> CachedTopology<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }

    /// Force the next load to go to the underlying provider.
    pub fn invalidate(&self) {
        self.cache.invalidate(&());
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: TopologyProvider> TopologyProvider for CachedTopology<P> {
    fn load(&self) -> DlrResult<Network> {
        self.cache.get_or_try_insert_with((), || self.inner.load())
    }

    fn describe(&self) -> String {
        format!("cached({})", self.inner.describe())
    }
}
