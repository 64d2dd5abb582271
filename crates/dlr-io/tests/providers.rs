//! Topology and weather providers over real files.

use std::fs;
use std::time::Duration;

use dlr_core::{DlrError, GeoPoint, LoadScenario, TopologyProvider};
use dlr_io::{CachedTopology, CachedWeather, CsvTopology, JsonFileWeather, WeatherSource};
use tempfile::tempdir;

const BUSES: &str = "id,name,lat,lon,v_nom_kv\nA,,40.0,-105.0,230\nB,,40.0,-104.0,230\n";

#[test]
fn cached_topology_serves_stale_copy_until_invalidated() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("buses.csv"), BUSES).unwrap();
    fs::write(dir.path().join("lines.csv"), "id,bus0,bus1,flow_mw\nAB,A,B,100\n").unwrap();

    let provider = CachedTopology::new(CsvTopology::new(dir.path()), Duration::from_secs(600));
    assert_eq!(provider.load().unwrap().line_count(), 1);

    fs::write(
        dir.path().join("lines.csv"),
        "id,bus0,bus1,flow_mw\nAB,A,B,100\nBA,B,A,50\n",
    )
    .unwrap();
    assert_eq!(provider.load().unwrap().line_count(), 1);

    provider.invalidate();
    assert_eq!(provider.load().unwrap().line_count(), 2);
    assert!(provider.describe().starts_with("cached(csv:"));
}

#[test]
fn empty_grid_is_unavailable() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("buses.csv"), BUSES).unwrap();
    fs::write(dir.path().join("lines.csv"), "id,bus0,bus1,flow_mw\nAX,A,X,1\n").unwrap();

    let err = CsvTopology::new(dir.path()).load().unwrap_err();
    assert!(matches!(err, DlrError::TopologyUnavailable(_)));
}

#[test]
fn weather_file_through_cache() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weather.json");
    fs::write(
        &path,
        r#"{"ambient_c": 35.0, "wind_speed_ms": 1.0, "wind_direction_deg": 90.0}"#,
    )
    .unwrap();

    let weather = CachedWeather::new(JsonFileWeather::new(&path), Duration::from_secs(60));
    let here = GeoPoint::new(39.74, -104.99);
    let env = weather
        .current(here)
        .unwrap()
        .to_environment(LoadScenario::Nominal);
    assert_eq!(env.ambient.value(), 35.0);

    // Cached: a broken file is not re-read until invalidated
    fs::write(&path, "not json").unwrap();
    assert!(weather.current(here).is_ok());
    weather.invalidate(here);
    assert!(weather.current(here).unwrap_err().is_unavailable());
}
