//! End-to-end engine runs over the Front Range fixture grid.

use std::path::PathBuf;
use std::time::Duration;

use dlr_algo::{lines_in_region, OutageSet, Region, StressEngine};
use dlr_core::{Environment, LineId, LoadScenario, Network, TopologyProvider};
use dlr_io::{CachedTopology, CsvTopology};

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn fixture() -> Network {
    CsvTopology::new(repo_path("test_data/grid")).load().unwrap()
}

fn id(s: &str) -> LineId {
    LineId::new(s)
}

#[test]
fn fixture_loads_with_one_skipped_row() {
    let (network, diag) = CsvTopology::new(repo_path("test_data/grid"))
        .load_with_diagnostics()
        .unwrap();
    assert_eq!(network.bus_count(), 9);
    assert_eq!(network.line_count(), 9);
    // L10 references an unknown bus
    assert_eq!(diag.stats.skipped_rows, 1);
    assert_eq!(network.line(&id("L7")).unwrap().voltage.value(), 115.0);
    assert_eq!(network.line(&id("L7")).unwrap().azimuth.value(), 164.0);
    assert_eq!(network.line(&id("L8")).unwrap().azimuth.value(), 0.0);
}

#[test]
fn baseline_stress_under_default_weather() {
    let network = fixture();
    let engine = StressEngine::default();
    let report = engine.evaluate(&network, &Environment::default());

    assert_eq!(report.lines.len(), 9);
    let bands = report.summary.bands;
    assert_eq!((bands.low, bands.medium, bands.high, bands.overload), (4, 4, 1, 0));
    assert!((report.summary.max_stress - 97.4).abs() < 0.5);
    assert!((report.summary.ssi - 0.465).abs() < 0.01);

    let l6 = report.lines.iter().find(|l| l.id == id("L6")).unwrap();
    let t = l6.overload_temp_c.unwrap();
    assert!(t > 25.0 && t < 60.0, "overload ambient {t}");

    let l8 = report.lines.iter().find(|l| l.id == id("L8")).unwrap();
    assert!(l8.conductor_fallback);
    assert!(report
        .diagnostics
        .issues
        .iter()
        .any(|i| i.category == "conductor"));
    assert!(report.lines.iter().all(|l| l.rating_a >= 100.0));
}

#[test]
fn max_scenario_overloads_the_southern_tie() {
    let network = fixture();
    let env = Environment::default().with_scenario(LoadScenario::Max);
    let report = StressEngine::default().evaluate(&network, &env);

    assert_eq!(report.summary.bands.overload, 1);
    let l6 = report.lines.iter().find(|l| l.id == id("L6")).unwrap();
    assert!(l6.stress_pct > 100.0);
    // Over its rating even at the coldest ambient searched
    assert_eq!(l6.overload_temp_c, Some(0.0));
}

#[test]
fn n1_ranks_outages_around_the_southern_tie() {
    let network = fixture();
    let contingencies = StressEngine::default().contingencies(&network, &Environment::default());

    assert_eq!(contingencies.total_screened, 9);
    assert_eq!(contingencies.isolated, 1);
    assert_eq!(contingencies.with_issues, 7);
    assert!(contingencies.results.len() <= 10);

    let order: Vec<&str> = contingencies
        .results
        .iter()
        .map(|r| r.outage_line_id.as_str())
        .collect();
    // Four outages tie on L6 at 126.6 %; ties go by line id
    assert_eq!(&order[..4], &["L1", "L5", "L7", "L9"]);
    assert!(!order.contains(&"L3"));
    assert!(!order.contains(&"L8"));

    let worst = &contingencies.results[0];
    assert_eq!(worst.issues[0].line_id, id("L6"));
    assert!((worst.max_stress - 126.6).abs() < 0.5);
    assert!(contingencies
        .results
        .windows(2)
        .all(|w| w[0].max_stress >= w[1].max_stress));
}

#[test]
fn cutting_the_southern_tie_loads_its_neighbors() {
    let network = fixture();
    let engine = StressEngine::default();
    let env = Environment::default();
    let report = engine.evaluate(&network, &env);

    let cuts: OutageSet = [id("L6")].into_iter().collect();
    let view = engine.outage_view_for(&network, &report, &cuts);
    assert_eq!(view.summary.line_count, 8);
    assert!(view.get(&id("L6")).unwrap().is_cut());

    let l1 = view.get(&id("L1")).unwrap();
    assert_eq!(l1.incident_cuts, 1);
    assert!((l1.adjusted_stress.unwrap() - l1.baseline_stress * 1.3).abs() < 1e-9);
    let l3 = view.get(&id("L3")).unwrap();
    assert_eq!(l3.adjusted_stress, Some(l3.baseline_stress));

    // Restoring everything returns to the baseline summary
    let restored = engine.outage_view_for(&network, &report, &OutageSet::new());
    assert_eq!(restored.summary, report.summary);
}

#[test]
fn region_cut_covers_lines_touching_denver() {
    let network = fixture();
    let json = std::fs::read_to_string(repo_path("test_data/grid/region.json")).unwrap();
    let region = Region::from_json(&json).unwrap();
    let ids = lines_in_region(&network, &region);
    assert_eq!(ids, vec![id("L1"), id("L5"), id("L6"), id("L9")]);
}

#[test]
fn cached_topology_feeds_contingencies() {
    let provider = CachedTopology::new(
        CsvTopology::new(repo_path("test_data/grid")),
        Duration::from_secs(300),
    );
    let engine = StressEngine::default();
    let first = engine
        .contingencies_from(&provider, &Environment::default())
        .unwrap();
    let second = engine
        .contingencies_from(&provider, &Environment::default())
        .unwrap();
    assert_eq!(first.results, second.results);

    let missing = CsvTopology::new(repo_path("test_data/no-such-grid"));
    let err = engine
        .contingencies_from(&missing, &Environment::default())
        .unwrap_err();
    assert!(err.is_unavailable());
}
