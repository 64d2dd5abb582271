use crate::{BusId, Network};
use petgraph::algo::connected_components;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Summary statistics produced by `graph stats` (density/degree/connected components).
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub bus_count: usize,
    pub line_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// Island summary used in `graph islands`.
#[derive(Debug, Clone, Serialize)]
pub struct IslandSummary {
    pub island_id: usize,
    pub bus_count: usize,
    pub line_count: usize,
}

/// Which island a bus belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct BusAssignment {
    pub bus: BusId,
    pub island_id: usize,
}

/// Aggregated island analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct IslandAnalysis {
    pub islands: Vec<IslandSummary>,
    pub assignments: Vec<BusAssignment>,
}

/// Degree distribution, density and component count of the bus-line graph.
///
/// Degree counts line ends, so parallel circuits each contribute.
pub fn graph_stats(network: &Network) -> GraphStats {
    let bus_count = network.graph.node_count();
    let line_count = network.graph.edge_count();
    let degrees: Vec<usize> = network
        .graph
        .node_indices()
        .map(|node| network.graph.edges(node).count())
        .collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let avg_degree = if bus_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / bus_count as f64
    };
    let density = if bus_count < 2 {
        0.0
    } else {
        2.0 * line_count as f64 / (bus_count as f64 * (bus_count as f64 - 1.0))
    };
    GraphStats {
        bus_count,
        line_count,
        connected_components: connected_components(&network.graph),
        min_degree,
        avg_degree,
        max_degree,
        density,
    }
}

/// Labels connected components with a breadth-first search, in bus insertion order.
pub fn find_islands(network: &Network) -> IslandAnalysis {
    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    let mut assignments = Vec::new();
    for start in network.graph.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let island_id = islands.len();
        let mut queue = VecDeque::from([start]);
        let mut members = Vec::new();
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            members.push(node);
            for neighbor in network.graph.neighbors(node) {
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        // Every line lies wholly inside one island; count it from one end
        let line_count = network
            .graph
            .edge_indices()
            .filter_map(|edge| network.graph.edge_endpoints(edge))
            .filter(|(a, _)| members.contains(a))
            .count();
        islands.push(IslandSummary {
            island_id,
            bus_count: members.len(),
            line_count,
        });
        members.sort_unstable();
        for node in members {
            assignments.push(BusAssignment {
                bus: network.graph[node].id.clone(),
                island_id,
            });
        }
    }
    IslandAnalysis {
        islands,
        assignments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bus, Line};

    fn two_islands() -> Network {
        let mut network = Network::new();
        for id in ["A", "B", "C", "X", "Y"] {
            network.add_bus(Bus::new(id, 138.0)).unwrap();
        }
        network.add_line(Line::new("AB", "A", "B")).unwrap();
        network.add_line(Line::new("BC", "B", "C")).unwrap();
        network.add_line(Line::new("XY", "X", "Y")).unwrap();
        network
    }

    #[test]
    fn stats_count_components_and_degrees() {
        let stats = graph_stats(&two_islands());
        assert_eq!(stats.bus_count, 5);
        assert_eq!(stats.line_count, 3);
        assert_eq!(stats.connected_components, 2);
        assert_eq!(stats.min_degree, 1);
        assert_eq!(stats.max_degree, 2);
        assert!((stats.avg_degree - 1.2).abs() < 1e-12);
        assert!((stats.density - 0.3).abs() < 1e-12);
    }

    #[test]
    fn stats_on_empty_network() {
        let stats = graph_stats(&Network::new());
        assert_eq!(stats.bus_count, 0);
        assert_eq!(stats.avg_degree, 0.0);
        assert_eq!(stats.density, 0.0);
    }

    #[test]
    fn islands_are_labelled_in_order() {
        let analysis = find_islands(&two_islands());
        assert_eq!(analysis.islands.len(), 2);
        assert_eq!(analysis.islands[0].bus_count, 3);
        assert_eq!(analysis.islands[0].line_count, 2);
        assert_eq!(analysis.islands[1].bus_count, 2);
        assert_eq!(analysis.islands[1].line_count, 1);
        let y = analysis
            .assignments
            .iter()
            .find(|a| a.bus.as_str() == "Y")
            .unwrap();
        assert_eq!(y.island_id, 1);
    }
}
