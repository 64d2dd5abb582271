use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use dlr_algo::{BandEdges, StressEngine, SystemSummary};
use tabwriter::TabWriter;

use dlr_cli::{EnvArgs, OutputFormat};

use crate::common::{fmt_opt, load_network, print_json, WeatherContext};

pub fn handle(
    engine: &StressEngine,
    weather: &WeatherContext,
    grid_dir: &Path,
    env_args: &EnvArgs,
    format: OutputFormat,
) -> Result<()> {
    let network = load_network(grid_dir)?;
    let env = weather.resolve(env_args, &network)?;
    let report = engine.evaluate(&network, &env).rounded();

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    let bands = &engine.config().bands;
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "LINE\tNAME\tRATING_A\tACTUAL_A\tSTRESS_%\tBAND\tOVERLOAD_AT_C")?;
    for line in &report.lines {
        let conductor_note = if line.conductor_fallback { " †" } else { "" };
        writeln!(
            writer,
            "{}\t{}\t{:.1}{}\t{:.1}\t{:.1}\t{}\t{}",
            line.id,
            line.name,
            line.rating_a,
            conductor_note,
            line.actual_a,
            line.stress_pct,
            bands.classify(line.stress_pct).as_str(),
            fmt_opt(line.overload_temp_c)
        )?;
    }
    writer.flush()?;
    if report.lines.iter().any(|l| l.conductor_fallback) {
        println!("† unknown conductor, rated as the default conductor");
    }
    println!();
    print_summary(&report.summary, bands);
    Ok(())
}

/// Band counts, mean/max stress and SSI as printed by `stress` and `outage`.
pub fn print_summary(summary: &SystemSummary, bands: &BandEdges) {
    println!(
        "Lines: {}  SSI: {:.3}  Avg stress: {:.1}%  Max stress: {:.1}%",
        summary.line_count, summary.ssi, summary.avg_stress, summary.max_stress
    );
    println!(
        "Bands: <{:.0}%: {} | {:.0}-{:.0}%: {} | {:.0}-{:.0}%: {} | >={:.0}%: {}",
        bands.medium_pct,
        summary.bands.low,
        bands.medium_pct,
        bands.high_pct,
        summary.bands.medium,
        bands.high_pct,
        bands.overload_pct,
        summary.bands.high,
        bands.overload_pct,
        summary.bands.overload
    );
}
