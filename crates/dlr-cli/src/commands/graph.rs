use anyhow::Result;
use dlr_core::graph_utils;

use dlr_cli::GraphCommands;

use crate::common::load_network;

pub fn handle(command: &GraphCommands) -> Result<()> {
    match command {
        GraphCommands::Stats { grid_dir } => {
            let network = load_network(grid_dir)?;
            let stats = graph_utils::graph_stats(&network);
            println!("Graph statistics for {}:", grid_dir.display());
            println!("  Buses         : {}", stats.bus_count);
            println!("  Lines         : {}", stats.line_count);
            println!("  Components    : {}", stats.connected_components);
            println!(
                "  Degree [min/avg/max]: {}/{:.2}/{}",
                stats.min_degree, stats.avg_degree, stats.max_degree
            );
            println!("  Density       : {:.4}", stats.density);
            println!("  {}", network.stats());
            Ok(())
        }
        GraphCommands::Islands { grid_dir, emit } => {
            let network = load_network(grid_dir)?;
            let analysis = graph_utils::find_islands(&network);
            for summary in &analysis.islands {
                println!(
                    "Island {}: {} bus(es), {} line(s)",
                    summary.island_id, summary.bus_count, summary.line_count
                );
            }
            if *emit {
                println!("\nBus → Island assignments:");
                for assignment in &analysis.assignments {
                    println!(
                        "  {:<12} -> island {}",
                        assignment.bus.as_str(),
                        assignment.island_id
                    );
                }
            }
            Ok(())
        }
    }
}
