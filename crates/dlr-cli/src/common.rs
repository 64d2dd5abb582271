//! Shared plumbing for the grid commands: loading, weather, output.

use std::io::{self, Write};
use std::path::Path;
#[cfg(feature = "http")]
use std::time::Duration;

use anyhow::{Context, Result};
use dlr_algo::StressEngine;
use dlr_core::{
    Celsius, ConductorCatalog, Degrees, Environment, GeoPoint, MetersPerSecond, Network,
};
use dlr_io::conductors::extend_catalog;
use dlr_io::weather::{JsonFileWeather, WeatherObservation, WeatherSource};
use dlr_io::CsvTopology;
use serde::Serialize;
use tracing::{info, warn};

use dlr_cli::{DlrConfig, EnvArgs, WeatherConfig, WeatherSourceKind};

/// Engine built from the configuration plus any extra conductor catalog.
pub fn build_engine(config: &DlrConfig, conductors: Option<&Path>) -> Result<StressEngine> {
    let mut catalog = ConductorCatalog::builtin();
    if let Some(path) = conductors.or(config.conductors.as_deref()) {
        let (added, diag) = extend_catalog(&mut catalog, path)?;
        if diag.has_errors() {
            warn!("{}: {} conductor row(s) skipped", path.display(), diag.stats.skipped_rows);
        }
        info!("added {added} conductor(s) from {}", path.display());
    }
    Ok(StressEngine::new(catalog, config.engine))
}

pub fn load_network(grid_dir: &Path) -> Result<Network> {
    let (network, diag) = CsvTopology::new(grid_dir)
        .load_with_diagnostics()
        .with_context(|| format!("loading grid {}", grid_dir.display()))?;
    if network.line_count() == 0 {
        anyhow::bail!("grid {} has no usable lines", grid_dir.display());
    }
    if diag.stats.skipped_rows > 0 {
        warn!(
            "{}: {} row(s) skipped",
            grid_dir.display(),
            diag.stats.skipped_rows
        );
    }
    Ok(network)
}

/// Mean position of the buses with valid coordinates.
pub fn centroid(network: &Network) -> Option<GeoPoint> {
    let (count, lat, lon) = network
        .buses()
        .filter(|bus| bus.position.is_valid())
        .fold((0usize, 0.0, 0.0), |(n, lat, lon), bus| {
            (n + 1, lat + bus.position.lat, lon + bus.position.lon)
        });
    (count > 0).then(|| GeoPoint::new(lat / count as f64, lon / count as f64))
}

fn forecast_location(weather: &WeatherConfig, network: &Network) -> GeoPoint {
    match (weather.lat, weather.lon) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
        _ => centroid(network).unwrap_or_default(),
    }
}

/// Weather configuration plus the live source, built once per process.
pub struct WeatherContext {
    config: WeatherConfig,
    live: Option<Box<dyn WeatherSource>>,
}

impl WeatherContext {
    pub fn from_config(config: &WeatherConfig) -> Self {
        let live = match config.source {
            WeatherSourceKind::OpenMeteo => live_source(config),
            WeatherSourceKind::Static => None,
        };
        Self::with_live(config.clone(), live)
    }

    pub fn with_live(config: WeatherConfig, live: Option<Box<dyn WeatherSource>>) -> Self {
        Self { config, live }
    }

    fn live_observation(&self, location: GeoPoint) -> Result<WeatherObservation> {
        match &self.live {
            Some(source) => Ok(source.current(location)?),
            None => anyhow::bail!(
                "this build has no HTTP weather support; pass --weather or explicit conditions"
            ),
        }
    }

    /// Conditions for a grid command: weather file or live source first, then
    /// explicit flags on top.
    pub fn resolve(&self, args: &EnvArgs, network: &Network) -> Result<Environment> {
        let location = forecast_location(&self.config, network);
        let observation = if let Some(path) = &args.weather {
            Some(JsonFileWeather::new(path).current(location)?)
        } else if self.config.source == WeatherSourceKind::OpenMeteo && !args.has_overrides() {
            Some(self.live_observation(location)?)
        } else {
            None
        };

        let mut env = match observation {
            Some(obs) => obs.to_environment(args.scenario),
            None => Environment::default().with_scenario(args.scenario),
        };
        if let Some(ambient) = args.ambient {
            env.ambient = Celsius(ambient);
        }
        if let Some(speed) = args.wind_speed {
            env.wind_speed = MetersPerSecond(speed);
        }
        if let Some(direction) = args.wind_dir {
            env.wind_direction = Degrees(direction);
        }
        info!(
            ambient_c = env.ambient.value(),
            wind_speed_ms = env.wind_speed.value(),
            wind_direction_deg = env.wind_direction.value(),
            scenario = %env.scenario,
            "conditions"
        );
        Ok(env)
    }
}

#[cfg(feature = "http")]
fn live_source(config: &WeatherConfig) -> Option<Box<dyn WeatherSource>> {
    use dlr_io::weather::{CachedWeather, OpenMeteoWeather};

    Some(Box::new(CachedWeather::new(
        OpenMeteoWeather::new(config.endpoint.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs)),
        Duration::from_secs(config.ttl_secs),
    )))
}

#[cfg(not(feature = "http"))]
fn live_source(_config: &WeatherConfig) -> Option<Box<dyn WeatherSource>> {
    None
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

pub fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}
