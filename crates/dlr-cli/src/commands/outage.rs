use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use dlr_algo::region::cut_region;
use dlr_algo::{OutageSet, Region, StressEngine};
use dlr_core::LineId;
use tabwriter::TabWriter;
use tracing::info;

use dlr_cli::{EnvArgs, OutputFormat};

use crate::commands::stress::print_summary;
use crate::commands::util::parse_ids;
use crate::common::{fmt_opt, load_network, print_json, WeatherContext};

pub fn handle(
    engine: &StressEngine,
    weather: &WeatherContext,
    grid_dir: &Path,
    cut: &[String],
    region: Option<&Path>,
    env_args: &EnvArgs,
    format: OutputFormat,
) -> Result<()> {
    let network = load_network(grid_dir)?;
    let env = weather.resolve(env_args, &network)?;

    let mut cuts: OutageSet = parse_ids(cut).into_iter().map(LineId::new).collect();
    if let Some(path) = region {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading region {}", path.display()))?;
        let region = Region::from_json(&json)
            .with_context(|| format!("parsing region {}", path.display()))?;
        let added = cut_region(&network, &region, &mut cuts);
        info!(region = %region.name, lines = added, "region cut");
    }

    let view = engine.outage_view(&network, &env, &cuts).rounded();
    if format == OutputFormat::Json {
        return print_json(&view);
    }

    let cut_list = view
        .cut
        .iter()
        .map(LineId::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "Cut: {}",
        if cut_list.is_empty() { "none" } else { &cut_list }
    );
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "LINE\tNAME\tBASELINE_%\tADJUSTED_%\tCUT_NEIGHBORS")?;
    for line in &view.lines {
        let adjusted = if line.is_cut() {
            "cut".to_string()
        } else {
            fmt_opt(line.adjusted_stress)
        };
        writeln!(
            writer,
            "{}\t{}\t{:.1}\t{}\t{}",
            line.id, line.name, line.baseline_stress, adjusted, line.incident_cuts
        )?;
    }
    writer.flush()?;
    println!();
    print_summary(&view.summary, &engine.config().bands);
    Ok(())
}
