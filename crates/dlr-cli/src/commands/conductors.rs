use std::io::{self, Write};

use anyhow::Result;
use dlr_algo::StressEngine;
use dlr_core::Conductor;
use tabwriter::TabWriter;

use dlr_cli::OutputFormat;

use crate::common::print_json;

pub fn handle(engine: &StressEngine, format: OutputFormat) -> Result<()> {
    let catalog = engine.catalog();
    let conductors: Vec<&Conductor> = catalog.iter().collect();
    match format {
        OutputFormat::Json => print_json(&conductors),
        OutputFormat::Table => {
            let default = &catalog.default_conductor().name;
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "NAME\tCODE\tDIAMETER_MM\tR25_OHM_KM\tALPHA\tEMISSIVITY")?;
            for c in conductors {
                let marker = if &c.name == default { " *" } else { "" };
                writeln!(
                    writer,
                    "{}{}\t{}\t{:.2}\t{:.4}\t{:.5}\t{:.2}",
                    c.name,
                    marker,
                    c.code_word,
                    c.diameter_mm,
                    c.r25_ohm_per_km,
                    c.alpha_per_c,
                    c.emissivity
                )?;
            }
            writer.flush()?;
            println!("* default for unknown conductor names");
            Ok(())
        }
    }
}
