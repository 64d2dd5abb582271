//! `dlr.toml`: engine constants, weather source and logging defaults.
//!
//! ```toml
//! conductors = "/srv/grid/conductors.csv"
//!
//! [engine.contingency]
//! issue_threshold_pct = 85.0
//!
//! [weather]
//! source = "open-meteo"
//! lat = 39.74
//! lon = -104.99
//! ttl_secs = 900
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Every key is optional; a missing default file means all defaults.

use anyhow::{Context, Result};
use dlr_algo::EngineConfig;
use dlr_io::weather::OPEN_METEO_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DlrConfig {
    /// Extra conductor catalog (CSV)
    #[serde(default)]
    pub conductors: Option<PathBuf>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherSourceKind {
    /// Command-line values or defaults only
    #[default]
    Static,
    /// Open-Meteo hourly forecast
    OpenMeteo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub source: WeatherSourceKind,
    /// Forecast location; the grid's bus centroid when unset
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            source: WeatherSourceKind::default(),
            lat: None,
            lon: None,
            ttl_secs: default_ttl_secs(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    600
}

fn default_endpoint() -> String {
    OPEN_METEO_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `<config dir>/dlr/dlr.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dlr").join("dlr.toml"))
}

pub fn parse_config(contents: &str) -> Result<DlrConfig> {
    let config: DlrConfig = toml::from_str(contents)?;
    config.engine.validate()?;
    Ok(config)
}

/// Load an explicit config file (must exist) or the default one (may not).
pub fn load_config(explicit: Option<&Path>) -> Result<DlrConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(DlrConfig::default()),
        },
    };
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.weather.source, WeatherSourceKind::Static);
        assert_eq!(config.weather.ttl_secs, 600);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = parse_config(
            r#"
            [engine.contingency]
            issue_threshold_pct = 85.0

            [weather]
            source = "open-meteo"
            lat = 39.74
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.contingency.issue_threshold_pct, 85.0);
        assert_eq!(config.engine.contingency.top_n, 10);
        assert_eq!(config.weather.source, WeatherSourceKind::OpenMeteo);
        assert_eq!(config.weather.lat, Some(39.74));
        assert_eq!(config.weather.endpoint, OPEN_METEO_ENDPOINT);
    }

    #[test]
    fn invalid_engine_values_are_rejected() {
        assert!(parse_config("[engine.overload]\niterations = 0\n").is_err());
        assert!(parse_config("[weather]\nsource = \"satellite\"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/no/such/dlr.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("reading config"));
    }
}
