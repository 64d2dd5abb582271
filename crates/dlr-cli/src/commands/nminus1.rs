use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use dlr_algo::StressEngine;
use tabwriter::TabWriter;

use dlr_cli::{EnvArgs, OutputFormat};

use crate::common::{load_network, print_json, WeatherContext};

pub fn handle(
    engine: &StressEngine,
    weather: &WeatherContext,
    grid_dir: &Path,
    env_args: &EnvArgs,
    format: OutputFormat,
) -> Result<()> {
    let network = load_network(grid_dir)?;
    let env = weather.resolve(env_args, &network)?;
    let mut report = engine.contingencies(&network, &env);
    report.results = report.results.iter().map(|r| r.rounded()).collect();

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    println!("{}", report.summary());
    if report.results.is_empty() {
        println!(
            "No outage pushes a neighboring line above {:.0}%.",
            engine.config().contingency.issue_threshold_pct
        );
        return Ok(());
    }
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "RANK\tOUTAGE\tNAME\tMAX_STRESS_%\tOVERLOADED_NEIGHBORS")?;
    for (rank, result) in report.results.iter().enumerate() {
        let issues = result
            .issues
            .iter()
            .map(|issue| format!("{} ({:.1}%)", issue.line_id, issue.stress_pct))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            writer,
            "{}\t{}\t{}\t{:.1}\t{}",
            rank + 1,
            result.outage_line_id,
            result.outage_name,
            result.max_stress,
            issues
        )?;
    }
    writer.flush()?;
    Ok(())
}
