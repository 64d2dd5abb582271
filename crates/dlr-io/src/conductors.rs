//! Conductor catalog extensions from CSV.
//!
//! ```text
//! name,code_word,diameter_mm,r25_ohm_per_km,alpha,emissivity,absorptivity
//! 605 ACSR 26/7 SQUAB,SQUAB,24.51,0.0952,0.00404,0.5,0.5
//! ```
//!
//! `code_word`, `alpha`, `emissivity` and `absorptivity` may be empty. A row
//! with the same name as an existing conductor replaces it.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use dlr_core::{Conductor, ConductorCatalog, DlrError, DlrResult, ImportDiagnostics};
use serde::Deserialize;
use tracing::warn;

const DEFAULT_ALPHA: f64 = 0.00404;
const DEFAULT_SURFACE: f64 = 0.5;

#[derive(Debug, Deserialize)]
struct ConductorRecord {
    name: String,
    #[serde(default)]
    code_word: Option<String>,
    diameter_mm: f64,
    r25_ohm_per_km: f64,
    #[serde(default)]
    alpha: Option<f64>,
    #[serde(default)]
    emissivity: Option<f64>,
    #[serde(default)]
    absorptivity: Option<f64>,
}

impl ConductorRecord {
    fn into_conductor(self) -> Conductor {
        let code_word = self
            .code_word
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.name.split_whitespace().last().map(str::to_string))
            .unwrap_or_default()
            .to_ascii_uppercase();
        Conductor {
            name: self.name.trim().to_string(),
            code_word,
            diameter_mm: self.diameter_mm,
            r25_ohm_per_km: self.r25_ohm_per_km,
            alpha_per_c: self.alpha.unwrap_or(DEFAULT_ALPHA),
            emissivity: self.emissivity.unwrap_or(DEFAULT_SURFACE),
            absorptivity: self.absorptivity.unwrap_or(DEFAULT_SURFACE),
        }
    }
}

/// Read conductor rows; invalid rows are skipped and recorded.
pub fn read_conductors<R: Read>(reader: R) -> (Vec<Conductor>, ImportDiagnostics) {
    let mut diag = ImportDiagnostics::new();
    let mut conductors = Vec::new();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    for (idx, result) in rdr.deserialize::<ConductorRecord>().enumerate() {
        let row = idx + 2;
        let conductor = match result {
            Ok(record) => record.into_conductor(),
            Err(err) => {
                warn!(row, "conductor row skipped: {err}");
                diag.add_skipped_row("parse", &err.to_string(), row);
                continue;
            }
        };
        if let Err(msg) = conductor.validate() {
            warn!(row, "conductor row skipped: {msg}");
            diag.add_skipped_row("validation", &msg, row);
            continue;
        }
        conductors.push(conductor);
    }
    (conductors, diag)
}

/// Add the conductors in a CSV file to a catalog; returns how many were added.
pub fn extend_catalog(
    catalog: &mut ConductorCatalog,
    path: &Path,
) -> DlrResult<(usize, ImportDiagnostics)> {
    let file = std::fs::File::open(path)
        .map_err(|err| DlrError::Config(format!("{}: {err}", path.display())))?;
    let (conductors, diag) = read_conductors(file);
    let added = conductors.len();
    for conductor in conductors {
        catalog.insert(conductor);
    }
    Ok((added, diag))
}
