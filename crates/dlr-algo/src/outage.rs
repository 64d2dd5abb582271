//! Manual outage simulation.
//!
//! A cut line is out of service: it has no stress and is left out of every
//! aggregate. Each surviving line picks up extra stress for every cut line that
//! shares one of its buses:
//!
//! ```text
//! adjusted = baseline · (1 + min(incident_cuts · per_cut, cap))
//! ```
//!
//! The multiplier is always applied to the baseline, never to a previously
//! adjusted value, so any sequence of cuts and restores that ends in the same
//! cut set yields the same result, and an empty cut set reproduces the baseline
//! exactly.

use std::collections::BTreeSet;

use dlr_core::{LineId, Network};
use serde::{Deserialize, Serialize};

use crate::stress::{round1, LineStress};
use crate::summary::{summarize, BandEdges, SystemSummary};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutageConfig {
    /// Stress increase per incident cut line, as a fraction
    pub per_cut_uplift: f64,
    /// Cap on the total increase
    pub max_uplift: f64,
}

impl Default for OutageConfig {
    fn default() -> Self {
        Self {
            per_cut_uplift: 0.30,
            max_uplift: 0.60,
        }
    }
}

impl OutageConfig {
    pub fn multiplier(&self, incident_cuts: usize) -> f64 {
        1.0 + (incident_cuts as f64 * self.per_cut_uplift).min(self.max_uplift)
    }
}

/// The set of lines currently cut. Ordered so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutageSet {
    cut: BTreeSet<LineId>,
}

impl OutageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the line was already cut.
    pub fn cut(&mut self, id: LineId) -> bool {
        self.cut.insert(id)
    }

    /// Returns false if the line was not cut.
    pub fn restore(&mut self, id: &LineId) -> bool {
        self.cut.remove(id)
    }

    /// Flip a line's state; returns true if it is now cut.
    pub fn toggle(&mut self, id: LineId) -> bool {
        if self.cut.remove(&id) {
            false
        } else {
            self.cut.insert(id);
            true
        }
    }

    pub fn cut_all<I: IntoIterator<Item = LineId>>(&mut self, ids: I) {
        self.cut.extend(ids);
    }

    pub fn clear(&mut self) {
        self.cut.clear();
    }

    pub fn is_cut(&self, id: &LineId) -> bool {
        self.cut.contains(id)
    }

    pub fn len(&self) -> usize {
        self.cut.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cut.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineId> {
        self.cut.iter()
    }

    /// Cut ids that do not name a line in `network`.
    pub fn unknown_in<'a>(&'a self, network: &'a Network) -> impl Iterator<Item = &'a LineId> {
        self.cut.iter().filter(|id| !network.contains_line(id))
    }
}

impl FromIterator<LineId> for OutageSet {
    fn from_iter<I: IntoIterator<Item = LineId>>(iter: I) -> Self {
        Self {
            cut: iter.into_iter().collect(),
        }
    }
}

/// Number of distinct other lines sharing a bus with `id` that are cut.
pub fn incident_cuts(network: &Network, id: &LineId, cuts: &OutageSet) -> usize {
    network
        .neighbor_lines(id)
        .into_iter()
        .filter(|line| cuts.is_cut(&line.id))
        .count()
}

/// Outage-adjusted state of one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedLine {
    pub id: LineId,
    pub name: String,
    pub baseline_stress: f64,
    /// `None` when the line is cut
    pub adjusted_stress: Option<f64>,
    pub incident_cuts: usize,
}

impl AdjustedLine {
    pub fn is_cut(&self) -> bool {
        self.adjusted_stress.is_none()
    }
}

/// Outage-adjusted stresses plus the matching summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutageView {
    pub cut: Vec<LineId>,
    pub lines: Vec<AdjustedLine>,
    pub summary: SystemSummary,
}

impl OutageView {
    pub fn get(&self, id: &LineId) -> Option<&AdjustedLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Display copy with stresses rounded to one decimal.
    pub fn rounded(&self) -> OutageView {
        OutageView {
            cut: self.cut.clone(),
            lines: self
                .lines
                .iter()
                .map(|line| AdjustedLine {
                    baseline_stress: round1(line.baseline_stress),
                    adjusted_stress: line.adjusted_stress.map(round1),
                    ..line.clone()
                })
                .collect(),
            summary: self.summary.rounded(),
        }
    }
}

/// Adjusted stress for every line with a baseline, in baseline order.
pub fn adjusted_stress(
    network: &Network,
    baseline: &[LineStress],
    cuts: &OutageSet,
    config: &OutageConfig,
) -> Vec<AdjustedLine> {
    baseline
        .iter()
        .map(|base| {
            if cuts.is_cut(&base.id) {
                return AdjustedLine {
                    id: base.id.clone(),
                    name: base.name.clone(),
                    baseline_stress: base.stress_pct,
                    adjusted_stress: None,
                    incident_cuts: 0,
                };
            }
            let incident = if cuts.is_empty() {
                0
            } else {
                incident_cuts(network, &base.id, cuts)
            };
            AdjustedLine {
                id: base.id.clone(),
                name: base.name.clone(),
                baseline_stress: base.stress_pct,
                adjusted_stress: Some(base.stress_pct * config.multiplier(incident)),
                incident_cuts: incident,
            }
        })
        .collect()
}

/// Aggregate over lines still in service.
pub fn system_stats(lines: &[AdjustedLine], edges: &BandEdges) -> SystemSummary {
    summarize(lines.iter().filter_map(|line| line.adjusted_stress), edges)
}

/// Apply a cut set to baseline stresses and aggregate the result.
pub fn simulate(
    network: &Network,
    baseline: &[LineStress],
    cuts: &OutageSet,
    config: &OutageConfig,
    edges: &BandEdges,
) -> OutageView {
    let lines = adjusted_stress(network, baseline, cuts, config);
    let summary = system_stats(&lines, edges);
    OutageView {
        cut: cuts.iter().cloned().collect(),
        lines,
        summary,
    }
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

    /// T at bus B: lines AB, CB, DB all meet at B; BE hangs off too.
    fn junction() -> (Network, Vec<LineStress>) {
        let mut network = Network::new();
        for id in ["A", "B", "C", "D", "E"] {
            network.add_bus(Bus::new(id, 138.0)).unwrap();
        }
        for (id, a, b) in [("AB", "A", "B"), ("CB", "C", "B"), ("DB", "D", "B"), ("BE", "B", "E")] {
            network.add_line(Line::new(id, a, b)).unwrap();
        }
        let baseline = vec![
            stress("AB", 80.0),
            stress("CB", 40.0),
            stress("DB", 55.0),
            stress("BE", 20.0),
        ];
        (network, baseline)
    }

    #[test]
    fn two_incident_cuts_give_sixty_percent() {
        let (network, baseline) = junction();
        let cuts: OutageSet = [LineId::new("CB"), LineId::new("DB")].into_iter().collect();
        let view = simulate(
            &network,
            &baseline,
            &cuts,
            &OutageConfig::default(),
            &BandEdges::default(),
        );
        let ab = view.get(&LineId::new("AB")).unwrap();
        assert_eq!(ab.incident_cuts, 2);
        assert!((ab.adjusted_stress.unwrap() - 128.0).abs() < 1e-9);
        assert!(view.get(&LineId::new("CB")).unwrap().is_cut());
    }

    #[test]
    fn uplift_is_capped() {
        let (network, baseline) = junction();
        let cuts: OutageSet = ["AB", "CB", "DB"].into_iter().map(LineId::new).collect();
        let lines = adjusted_stress(&network, &baseline, &cuts, &OutageConfig::default());
        let be = lines.iter().find(|l| l.id.as_str() == "BE").unwrap();
        assert_eq!(be.incident_cuts, 3);
        assert!((be.adjusted_stress.unwrap() - 32.0).abs() < 1e-9);
    }

    #[test]
    fn cut_lines_leave_aggregates() {
        let (network, baseline) = junction();
        let cuts: OutageSet = [LineId::new("AB")].into_iter().collect();
        let view = simulate(
            &network,
            &baseline,
            &cuts,
            &OutageConfig::default(),
            &BandEdges::default(),
        );
        assert_eq!(view.summary.line_count, 3);
        // 40, 55, 20 each raised by 30 %
        assert!((view.summary.max_stress - 71.5).abs() < 1e-9);
        assert_eq!(view.summary.bands.medium, 1);
    }

    #[test]
    fn empty_cut_set_reproduces_baseline() {
        let (network, baseline) = junction();
        let lines = adjusted_stress(&network, &baseline, &OutageSet::new(), &OutageConfig::default());
        for (line, base) in lines.iter().zip(&baseline) {
            assert_eq!(line.adjusted_stress, Some(base.stress_pct));
        }
        let baseline_summary = summarize(baseline.iter().map(|s| s.stress_pct), &BandEdges::default());
        assert_eq!(system_stats(&lines, &BandEdges::default()), baseline_summary);
    }

    #[test]
    fn restore_round_trip_is_exact() {
        let (network, baseline) = junction();
        let config = OutageConfig::default();
        let edges = BandEdges::default();
        let original = simulate(&network, &baseline, &OutageSet::new(), &config, &edges);

        let mut cuts = OutageSet::new();
        cuts.cut(LineId::new("AB"));
        cuts.toggle(LineId::new("DB"));
        let _ = simulate(&network, &baseline, &cuts, &config, &edges);
        cuts.cut(LineId::new("BE"));
        cuts.restore(&LineId::new("AB"));
        let _ = simulate(&network, &baseline, &cuts, &config, &edges);
        cuts.toggle(LineId::new("DB"));
        cuts.restore(&LineId::new("BE"));
        assert!(cuts.is_empty());

        let restored = simulate(&network, &baseline, &cuts, &config, &edges);
        assert_eq!(restored, original);
    }

    #[test]
    fn outage_set_operations() {
        let mut cuts = OutageSet::new();
        assert!(cuts.cut(LineId::new("L1")));
        assert!(!cuts.cut(LineId::new("L1")));
        assert!(cuts.toggle(LineId::new("L2")));
        assert!(!cuts.toggle(LineId::new("L2")));
        cuts.cut_all(["L3", "L4"].into_iter().map(LineId::new));
        assert_eq!(cuts.len(), 3);
        assert!(cuts.restore(&LineId::new("L3")));
        assert!(!cuts.restore(&LineId::new("L3")));
        let ids: Vec<&str> = cuts.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["L1", "L4"]);
        cuts.clear();
        assert!(cuts.is_empty());
    }

    #[test]
    fn unknown_cut_ids_are_reported() {
        let (network, _) = junction();
        let cuts: OutageSet = ["AB", "ZZ"].into_iter().map(LineId::new).collect();
        let unknown: Vec<&str> = cuts.unknown_in(&network).map(|id| id.as_str()).collect();
        assert_eq!(unknown, vec!["ZZ"]);
    }
}
