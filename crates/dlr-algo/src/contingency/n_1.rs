use std::cmp::Ordering;
use std::collections::HashMap;

use dlr_core::{Amperes, LineId, Network};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::stress::{round1, stress_pct, LineStress};

/// Configuration for N-1 screening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContingencyConfig {
    /// Fractional flow increase applied to each neighbor of the outaged line
    pub uplift: f64,
    /// Neighbors strictly above this post-outage stress (%) are issues
    pub issue_threshold_pct: f64,
    /// Number of contingencies reported
    pub top_n: usize,
}

impl Default for ContingencyConfig {
    fn default() -> Self {
        Self {
            uplift: 0.30,
            issue_threshold_pct: 80.0,
            top_n: 10,
        }
    }
}

/// One neighbor pushed over the threshold by an outage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyIssue {
    pub line_id: LineId,
    pub name: String,
    pub stress_pct: f64,
}

/// Outcome of taking one line out of service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyResult {
    pub outage_line_id: LineId,
    pub outage_name: String,
    /// Sorted by descending stress
    pub issues: Vec<ContingencyIssue>,
    pub max_stress: f64,
}

impl ContingencyResult {
    /// Display copy with stresses rounded to one decimal.
    pub fn rounded(&self) -> ContingencyResult {
        ContingencyResult {
            outage_line_id: self.outage_line_id.clone(),
            outage_name: self.outage_name.clone(),
            issues: self
                .issues
                .iter()
                .map(|issue| ContingencyIssue {
                    stress_pct: round1(issue.stress_pct),
                    ..issue.clone()
                })
                .collect(),
            max_stress: round1(self.max_stress),
        }
    }
}

/// Results from N-1 screening.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContingencyReport {
    /// Top contingencies, worst first
    pub results: Vec<ContingencyResult>,
    /// Outages evaluated
    pub total_screened: usize,
    /// Outages skipped because the line has no neighbors
    pub isolated: usize,
    /// Outages with at least one issue, before truncation
    pub with_issues: usize,
}

impl ContingencyReport {
    pub fn summary(&self) -> String {
        format!(
            "N-1 screening: {}/{} outages produce issues ({} isolated), reporting top {}",
            self.with_issues,
            self.total_screened,
            self.isolated,
            self.results.len()
        )
    }
}

enum Screened {
    Isolated,
    Clear,
    Critical(ContingencyResult),
}

fn screen_outage(
    network: &Network,
    outage: &LineId,
    outage_name: &str,
    baseline: &HashMap<&LineId, &LineStress>,
    config: &ContingencyConfig,
) -> Screened {
    let neighbors = network.neighbor_lines(outage);
    if neighbors.is_empty() {
        return Screened::Isolated;
    }

    let mut issues: Vec<ContingencyIssue> = neighbors
        .into_iter()
        .filter_map(|line| {
            let base = baseline.get(&line.id)?;
            let post = stress_pct(
                Amperes(base.actual_a * (1.0 + config.uplift)),
                Amperes(base.rating_a),
            );
            (post > config.issue_threshold_pct).then(|| ContingencyIssue {
                line_id: line.id.clone(),
                name: line.name.clone(),
                stress_pct: post,
            })
        })
        .collect();
    if issues.is_empty() {
        return Screened::Clear;
    }

    issues.sort_by(|a, b| {
        b.stress_pct
            .total_cmp(&a.stress_pct)
            .then_with(|| a.line_id.cmp(&b.line_id))
    });
    let max_stress = issues[0].stress_pct;
    Screened::Critical(ContingencyResult {
        outage_line_id: outage.clone(),
        outage_name: outage_name.to_string(),
        issues,
        max_stress,
    })
}

fn by_severity(a: &ContingencyResult, b: &ContingencyResult) -> Ordering {
    b.max_stress
        .total_cmp(&a.max_stress)
        .then_with(|| a.outage_line_id.cmp(&b.outage_line_id))
}

/// Screen every single-line outage (parallel).
///
/// `baseline` holds each line's pre-outage stress under the conditions being
/// studied; neighbors missing from it are ignored.
pub fn screen_n1(
    network: &Network,
    baseline: &[LineStress],
    config: &ContingencyConfig,
) -> ContingencyReport {
    let by_id: HashMap<&LineId, &LineStress> = baseline.iter().map(|s| (&s.id, s)).collect();
    let outages: Vec<(&LineId, &str)> = network
        .lines()
        .map(|line| (&line.id, line.name.as_str()))
        .collect();

    let screened: Vec<Screened> = outages
        .par_iter()
        .map(|(id, name)| screen_outage(network, id, name, &by_id, config))
        .collect();

    let mut report = ContingencyReport {
        total_screened: screened.len(),
        ..ContingencyReport::default()
    };
    for outcome in screened {
        match outcome {
            Screened::Isolated => report.isolated += 1,
            Screened::Clear => {}
            Screened::Critical(result) => report.results.push(result),
        }
    }
    report.with_issues = report.results.len();
    report.results.sort_by(by_severity);
    report.results.truncate(config.top_n);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlr_core::{Bus, Line};

    fn stress(id: &str, stress_pct: f64) -> LineStress {
        LineStress {
            id: LineId::new(id),
            name: id.to_string(),
            rating_a: 1000.0,
            actual_a: stress_pct * 10.0,
            stress_pct,
            overload_temp_c: None,
            conductor_fallback: false,
        }
    }

    fn star(spokes: usize) -> Network {
        let mut network = Network::new();
        network.add_bus(Bus::new("HUB", 230.0)).unwrap();
        for i in 0..spokes {
            let bus = format!("S{i:02}");
            network.add_bus(Bus::new(bus.clone(), 230.0)).unwrap();
            network
                .add_line(Line::new(format!("L{i:02}"), "HUB", bus))
                .unwrap();
        }
        network
    }

    #[test]
    fn test_issue_threshold_is_strict() {
        let mut network = Network::new();
        for id in ["A", "B", "C"] {
            network.add_bus(Bus::new(id, 138.0)).unwrap();
        }
        network.add_line(Line::new("AB", "A", "B")).unwrap();
        network.add_line(Line::new("BC", "B", "C")).unwrap();

        // 50 % · 1.3 = 65 % stays below; 70 % · 1.3 = 91 % is an issue
        let baseline = vec![stress("AB", 70.0), stress("BC", 50.0)];
        let report = screen_n1(&network, &baseline, &ContingencyConfig::default());
        assert_eq!(report.total_screened, 2);
        assert_eq!(report.results.len(), 1);
        let result = &report.results[0];
        assert_eq!(result.outage_line_id.as_str(), "BC");
        assert_eq!(result.issues.len(), 1);
        assert!((result.max_stress - 91.0).abs() < 1e-9);
        assert!(result.issues.iter().all(|i| i.stress_pct > 80.0));
    }

    #[test]
    fn test_isolated_line_contributes_nothing() {
        let mut network = Network::new();
        network.add_bus(Bus::new("X", 69.0)).unwrap();
        network.add_bus(Bus::new("Y", 69.0)).unwrap();
        network.add_line(Line::new("XY", "X", "Y")).unwrap();

        let report = screen_n1(&network, &[stress("XY", 150.0)], &ContingencyConfig::default());
        assert!(report.results.is_empty());
        assert_eq!(report.isolated, 1);
    }

    #[test]
    fn test_ranked_and_truncated() {
        let network = star(15);
        let baseline: Vec<LineStress> = (0..15)
            .map(|i| stress(&format!("L{i:02}"), 60.0 + i as f64 * 2.0))
            .collect();
        let report = screen_n1(&network, &baseline, &ContingencyConfig::default());

        assert_eq!(report.with_issues, 15);
        assert_eq!(report.results.len(), 10);
        for pair in report.results.windows(2) {
            assert!(pair[0].max_stress >= pair[1].max_stress);
        }
        // Every outage except L14 sees L14 as its worst neighbor; equal
        // severities are ordered by outage id
        assert_eq!(report.results[0].outage_line_id.as_str(), "L00");
        assert_eq!(report.results[1].outage_line_id.as_str(), "L01");
        for result in &report.results {
            assert!(!result.issues.is_empty());
            for pair in result.issues.windows(2) {
                assert!(pair[0].stress_pct >= pair[1].stress_pct);
            }
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let network = star(12);
        let baseline: Vec<LineStress> = (0..12)
            .map(|i| stress(&format!("L{i:02}"), 75.0 + (i % 3) as f64))
            .collect();
        let first = screen_n1(&network, &baseline, &ContingencyConfig::default());
        for _ in 0..5 {
            let again = screen_n1(&network, &baseline, &ContingencyConfig::default());
            assert_eq!(again.results, first.results);
        }
    }

    #[test]
    fn test_zero_rating_neighbor_is_not_an_issue() {
        let network = star(2);
        let mut dead = stress("L01", 0.0);
        dead.rating_a = 0.0;
        dead.actual_a = 500.0;
        let report = screen_n1(
            &network,
            &[stress("L00", 10.0), dead],
            &ContingencyConfig::default(),
        );
        assert!(report.results.is_empty());
    }
}
