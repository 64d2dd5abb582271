//! Weather observations and the sources that provide them.
//!
//! The engine takes one [`Environment`] per computation. Sources return hourly
//! observations for a location; [`WeatherSource::current`] picks the one to use.
//!
//! | Source | Backing |
//! |--------|---------|
//! | [`StaticWeather`] | fixed values (CLI flags, tests) |
//! | [`JsonFileWeather`] | one observation object or an array of them |
//! | [`OpenMeteoWeather`] | Open-Meteo hourly forecast over HTTP (`http` feature) |
//! | [`CachedWeather`] | TTL cache in front of any other source |

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use dlr_core::{DlrError, DlrResult, Environment, GeoPoint, LoadScenario};
use serde::{Deserialize, Serialize};

use crate::cache::TtlCache;

/// One point-in-time weather reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    pub ambient_c: f64,
    pub wind_speed_ms: f64,
    /// Direction the wind blows from, degrees clockwise from north
    pub wind_direction_deg: f64,
}

impl WeatherObservation {
    pub fn new(ambient_c: f64, wind_speed_ms: f64, wind_direction_deg: f64) -> Self {
        Self {
            time: None,
            ambient_c,
            wind_speed_ms,
            wind_direction_deg,
        }
    }

    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn to_environment(&self, scenario: LoadScenario) -> Environment {
        Environment::new(self.ambient_c, self.wind_speed_ms, self.wind_direction_deg)
            .with_scenario(scenario)
    }
}

/// Pick the observation closest to `now`; untimed observations only win when
/// nothing is timed.
pub fn select_hour(
    observations: &[WeatherObservation],
    now: DateTime<Utc>,
) -> Option<WeatherObservation> {
    let timed = observations
        .iter()
        .filter_map(|obs| obs.time.map(|t| ((t - now).num_seconds().abs(), obs)))
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, obs)| *obs);
    timed.or_else(|| observations.first().copied())
}

pub trait WeatherSource: Send + Sync {
    /// Hourly observations for a location, oldest first.
    fn forecast(&self, location: GeoPoint) -> DlrResult<Vec<WeatherObservation>>;

    /// The observation for the current hour.
    fn current(&self, location: GeoPoint) -> DlrResult<WeatherObservation> {
        let observations = self.forecast(location)?;
        select_hour(&observations, Utc::now()).ok_or_else(|| {
            DlrError::WeatherUnavailable(format!("{}: no observations", self.describe()))
        })
    }

    fn describe(&self) -> String {
        "weather".into()
    }
}

impl<T: WeatherSource + ?Sized> WeatherSource for Box<T> {
    fn forecast(&self, location: GeoPoint) -> DlrResult<Vec<WeatherObservation>> {
        (**self).forecast(location)
    }

    fn current(&self, location: GeoPoint) -> DlrResult<WeatherObservation> {
        (**self).current(location)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// The same observation everywhere.
#[derive(Debug, Clone, Copy)]
pub struct StaticWeather(pub WeatherObservation);

impl WeatherSource for StaticWeather {
    fn forecast(&self, _location: GeoPoint) -> DlrResult<Vec<WeatherObservation>> {
        Ok(vec![self.0])
    }

    fn current(&self, _location: GeoPoint) -> DlrResult<WeatherObservation> {
        Ok(self.0)
    }

    fn describe(&self) -> String {
        "static".into()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ObservationFile {
    Many(Vec<WeatherObservation>),
    One(WeatherObservation),
}

/// Parse a weather JSON document: one observation object or an array.
pub fn parse_observations(json: &str) -> DlrResult<Vec<WeatherObservation>> {
    match serde_json::from_str::<ObservationFile>(json) {
        Ok(ObservationFile::Many(many)) => Ok(many),
        Ok(ObservationFile::One(one)) => Ok(vec![one]),
        Err(err) => Err(DlrError::WeatherUnavailable(format!(
            "invalid weather JSON: {err}"
        ))),
    }
}

/// Observations read from a JSON file on every call; location is ignored.
#[derive(Debug, Clone)]
pub struct JsonFileWeather {
    path: PathBuf,
}

impl JsonFileWeather {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WeatherSource for JsonFileWeather {
    fn forecast(&self, _location: GeoPoint) -> DlrResult<Vec<WeatherObservation>> {
        let text = std::fs::read_to_string(&self.path).map_err(|err| {
            DlrError::WeatherUnavailable(format!("{}: {err}", self.path.display()))
        })?;
        parse_observations(&text).map_err(|err| match err {
            DlrError::WeatherUnavailable(msg) => {
                DlrError::WeatherUnavailable(format!("{}: {msg}", self.path.display()))
            }
            other => other,
        })
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

pub const OPEN_METEO_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

const OPEN_METEO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Convert an Open-Meteo `hourly` response into observations.
///
/// Hours with any missing value are dropped. Times are read as UTC, which is
/// what the request asks for.
pub fn parse_open_meteo(body: &serde_json::Value) -> DlrResult<Vec<WeatherObservation>> {
    let hourly = &body["hourly"];
    let column = |name: &str| {
        hourly[name].as_array().ok_or_else(|| {
            DlrError::WeatherUnavailable(format!("forecast response has no hourly.{name}"))
        })
    };
    let times = column("time")?;
    let temps = column("temperature_2m")?;
    let speeds = column("wind_speed_10m")?;
    let dirs = column("wind_direction_10m")?;

    let observations = times
        .iter()
        .zip(temps)
        .zip(speeds)
        .zip(dirs)
        .filter_map(|(((time, temp), speed), dir)| {
            let obs = WeatherObservation::new(temp.as_f64()?, speed.as_f64()?, dir.as_f64()?);
            let time = time
                .as_str()
                .and_then(|t| NaiveDateTime::parse_from_str(t, OPEN_METEO_TIME_FORMAT).ok())
                .map(|t| t.and_utc());
            Some(match time {
                Some(time) => obs.at(time),
                None => obs,
            })
        })
        .collect::<Vec<_>>();

    if observations.is_empty() {
        return Err(DlrError::WeatherUnavailable(
            "forecast response has no usable hours".into(),
        ));
    }
    Ok(observations)
}

/// Hourly forecast from the Open-Meteo API.
#[derive(Debug, Clone)]
pub struct OpenMeteoWeather {
    endpoint: String,
    timeout: Duration,
}

impl Default for OpenMeteoWeather {
    fn default() -> Self {
        Self::new(OPEN_METEO_ENDPOINT)
    }
}

impl OpenMeteoWeather {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(feature = "http")]
impl WeatherSource for OpenMeteoWeather {
    fn forecast(&self, location: GeoPoint) -> DlrResult<Vec<WeatherObservation>> {
        use anyhow::Context;

        let fetch = || -> anyhow::Result<serde_json::Value> {
            let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
            let response = agent
                .get(&self.endpoint)
                .query("latitude", &location.lat.to_string())
                .query("longitude", &location.lon.to_string())
                .query("hourly", "temperature_2m,wind_speed_10m,wind_direction_10m")
                .query("wind_speed_unit", "ms")
                .query("timezone", "UTC")
                .query("forecast_days", "1")
                .call()
                .context("forecast request failed")?;
            response
                .into_json()
                .context("failed to parse forecast JSON")
        };

        tracing::debug!(lat = location.lat, lon = location.lon, "fetching forecast");
        let body = fetch().map_err(|err| {
            DlrError::WeatherUnavailable(format!("{}: {err:#}", self.endpoint))
        })?;
        parse_open_meteo(&body)
    }

    fn describe(&self) -> String {
        format!("open-meteo:{}", self.endpoint)
    }
}

type LocationKey = (i64, i64);

fn location_key(location: GeoPoint) -> LocationKey {
    (
        (location.lat * 100.0).round() as i64,
        (location.lon * 100.0).round() as i64,
    )
}

/// Weather source that reuses a forecast for nearby locations for a while.
///
/// Locations are keyed at two decimal places (about 1 km).
pub struct CachedWeather<S> {
    inner: S,
    cache: TtlCache<LocationKey, Vec<WeatherObservation>>,
}

impl<S: WeatherSource> CachedWeather<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }

    /// Drop the cached forecast for one location.
    pub fn invalidate(&self, location: GeoPoint) -> bool {
        self.cache.invalidate(&location_key(location))
    }

    pub fn invalidate_all(&self) {
        self.cache.clear();
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: WeatherSource> WeatherSource for CachedWeather<S> {
    fn forecast(&self, location: GeoPoint) -> DlrResult<Vec<WeatherObservation>> {
        self.cache
            .get_or_try_insert_with(location_key(location), || self.inner.forecast(location))
    }

    fn describe(&self) -> String {
        format!("cached({})", self.inner.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl WeatherSource for CountingSource {
        fn forecast(&self, location: GeoPoint) -> DlrResult<Vec<WeatherObservation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![WeatherObservation::new(location.lat, 1.0, 0.0)])
        }
    }

    struct Offline;

    impl WeatherSource for Offline {
        fn forecast(&self, _location: GeoPoint) -> DlrResult<Vec<WeatherObservation>> {
            Err(DlrError::WeatherUnavailable("offline".into()))
        }
    }

    #[test]
    fn observation_to_environment() {
        let env = WeatherObservation::new(31.5, 2.0, 270.0).to_environment(LoadScenario::Max);
        assert_eq!(env.ambient.value(), 31.5);
        assert_eq!(env.wind_direction.value(), 270.0);
        assert_eq!(env.scenario, LoadScenario::Max);
    }

    #[test]
    fn parse_single_object_and_array() {
        let one = parse_observations(
            r#"{"ambient_c": 20, "wind_speed_ms": 3.5, "wind_direction_deg": 180}"#,
        )
        .unwrap();
        assert_eq!(one, vec![WeatherObservation::new(20.0, 3.5, 180.0)]);

        let many = parse_observations(
            r#"[
                {"time": "2024-07-01T12:00:00Z", "ambient_c": 30, "wind_speed_ms": 1, "wind_direction_deg": 0},
                {"time": "2024-07-01T13:00:00Z", "ambient_c": 32, "wind_speed_ms": 1, "wind_direction_deg": 0}
            ]"#,
        )
        .unwrap();
        assert_eq!(many.len(), 2);
        assert!(many[0].time.is_some());

        let err = parse_observations("{\"ambient_c\": 1}").unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn select_closest_hour() {
        let base = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let obs: Vec<_> = (0..4)
            .map(|h| {
                WeatherObservation::new(20.0 + h as f64, 1.0, 0.0)
                    .at(base + chrono::Duration::hours(h))
            })
            .collect();
        let now = base + chrono::Duration::minutes(130);
        assert_eq!(select_hour(&obs, now).unwrap().ambient_c, 22.0);
        assert!(select_hour(&[], now).is_none());

        let untimed = [WeatherObservation::new(5.0, 1.0, 0.0)];
        assert_eq!(select_hour(&untimed, now).unwrap().ambient_c, 5.0);
    }

    #[test]
    fn parse_open_meteo_hourly() {
        let body = serde_json::json!({
            "hourly": {
                "time": ["2024-07-01T00:00", "2024-07-01T01:00", "2024-07-01T02:00"],
                "temperature_2m": [18.2, 17.9, null],
                "wind_speed_10m": [3.1, 2.8, 2.5],
                "wind_direction_10m": [250, 245, 240]
            }
        });
        let obs = parse_open_meteo(&body).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].ambient_c, 18.2);
        assert_eq!(obs[1].wind_direction_deg, 245.0);
        assert_eq!(
            obs[0].time,
            Some(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap())
        );

        let err = parse_open_meteo(&serde_json::json!({"error": true})).unwrap_err();
        assert!(matches!(err, DlrError::WeatherUnavailable(_)));
    }

    #[test]
    fn cached_weather_reuses_nearby_forecasts() {
        let cached = CachedWeather::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            Duration::from_secs(600),
        );
        let here = GeoPoint::new(40.001, -105.002);
        let near = GeoPoint::new(40.004, -104.998);
        cached.current(here).unwrap();
        cached.current(near).unwrap();
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);

        cached.current(GeoPoint::new(41.0, -105.0)).unwrap();
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);

        assert!(cached.invalidate(here));
        cached.current(here).unwrap();
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn failures_surface_as_unavailable() {
        let cached = CachedWeather::new(Offline, Duration::from_secs(60));
        let err = cached.current(GeoPoint::new(0.0, 0.0)).unwrap_err();
        assert!(err.is_unavailable());

        let missing = JsonFileWeather::new("/no/such/weather.json");
        assert!(matches!(
            missing.current(GeoPoint::new(0.0, 0.0)),
            Err(DlrError::WeatherUnavailable(_))
        ));
    }
}
