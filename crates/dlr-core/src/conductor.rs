//! Conductor reference data.
//!
//! Physical parameters used by the heat balance. Values for the built-in ACSR
//! conductors follow the usual manufacturer tables (outer diameter, DC resistance
//! at 25 °C, aluminium temperature coefficient) with weathered-surface
//! emissivity/absorptivity of 0.5.
//!
//! Lookups never fail: an unrecognized name resolves to [`DEFAULT_CONDUCTOR`] and
//! the caller is told through [`ResolvedConductor::fallback`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Name of the conductor used when a line references an unknown type.
pub const DEFAULT_CONDUCTOR: &str = "795 ACSR 26/7 DRAKE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conductor {
    pub name: String,
    /// Short code word ("DRAKE"), matched as a token inside free-form names
    pub code_word: String,
    pub diameter_mm: f64,
    /// Resistance at 25 °C in Ω/km
    pub r25_ohm_per_km: f64,
    /// Temperature coefficient of resistance (1/°C)
    pub alpha_per_c: f64,
    pub emissivity: f64,
    pub absorptivity: f64,
}

impl Conductor {
    /// Outer diameter in metres
    #[inline]
    pub fn diameter_m(&self) -> f64 {
        self.diameter_mm / 1000.0
    }

    /// Resistance in Ω/m at the given conductor temperature:
    /// `R(T) = R25 · (1 + α · (T − 25))`.
    pub fn resistance_at(&self, temp_c: f64) -> f64 {
        self.r25_ohm_per_km / 1000.0 * (1.0 + self.alpha_per_c * (temp_c - 25.0))
    }

    /// Reject parameter sets the heat balance cannot use.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("conductor name is empty".to_string());
        }
        let positive = [
            ("diameter_mm", self.diameter_mm),
            ("r25_ohm_per_km", self.r25_ohm_per_km),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be positive, got {}", field, value));
            }
        }
        if !(self.alpha_per_c.is_finite() && self.alpha_per_c >= 0.0) {
            return Err(format!("alpha must be non-negative, got {}", self.alpha_per_c));
        }
        for (field, value) in [
            ("emissivity", self.emissivity),
            ("absorptivity", self.absorptivity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1], got {}", field, value));
            }
        }
        Ok(())
    }
}

fn acsr(name: &str, code_word: &str, diameter_mm: f64, r25_ohm_per_km: f64) -> Conductor {
    Conductor {
        name: name.to_string(),
        code_word: code_word.to_string(),
        diameter_mm,
        r25_ohm_per_km,
        alpha_per_c: 0.00404,
        emissivity: 0.5,
        absorptivity: 0.5,
    }
}

static BUILTIN: Lazy<Vec<Conductor>> = Lazy::new(|| {
    vec![
        acsr("336.4 ACSR 26/7 LINNET", "LINNET", 18.29, 0.1693),
        acsr("477 ACSR 26/7 HAWK", "HAWK", 21.79, 0.1170),
        acsr(DEFAULT_CONDUCTOR, "DRAKE", 28.14, 0.0724),
        acsr("954 ACSR 45/7 RAIL", "RAIL", 29.59, 0.0600),
        acsr("1272 ACSR 45/7 BITTERN", "BITTERN", 34.16, 0.0452),
        acsr("1590 ACSR 54/19 FALCON", "FALCON", 39.24, 0.0365),
    ]
});

/// Result of a catalog lookup.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedConductor<'a> {
    pub conductor: &'a Conductor,
    /// True when the requested name was not recognized and the default was used
    pub fallback: bool,
}

/// Immutable set of conductor types, loaded once.
#[derive(Debug, Clone)]
pub struct ConductorCatalog {
    conductors: Vec<Conductor>,
    default_index: usize,
}

impl Default for ConductorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ConductorCatalog {
    /// The built-in ACSR table.
    pub fn builtin() -> Self {
        let conductors = BUILTIN.clone();
        let default_index = conductors
            .iter()
            .position(|c| c.name == DEFAULT_CONDUCTOR)
            .unwrap_or(0);
        Self {
            conductors,
            default_index,
        }
    }

    /// Add or replace a conductor (matched by normalized name).
    pub fn insert(&mut self, conductor: Conductor) {
        let key = normalize(&conductor.name);
        match self.conductors.iter().position(|c| normalize(&c.name) == key) {
            Some(idx) => self.conductors[idx] = conductor,
            None => self.conductors.push(conductor),
        }
    }

    pub fn len(&self) -> usize {
        self.conductors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conductors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conductor> {
        self.conductors.iter()
    }

    pub fn default_conductor(&self) -> &Conductor {
        &self.conductors[self.default_index]
    }

    /// Exact (normalized) name match, then code-word token match.
    pub fn find(&self, name: &str) -> Option<&Conductor> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }
        if let Some(found) = self.conductors.iter().find(|c| normalize(&c.name) == key) {
            return Some(found);
        }
        let tokens: Vec<&str> = key
            .split(|ch: char| !ch.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        self.conductors.iter().find(|c| {
            let code = c.code_word.to_ascii_uppercase();
            tokens.iter().any(|t| *t == code)
        })
    }

    /// Look up a conductor, falling back to the default for unknown names.
    pub fn resolve(&self, name: &str) -> ResolvedConductor<'_> {
        match self.find(name) {
            Some(conductor) => ResolvedConductor {
                conductor,
                fallback: false,
            },
            None => ResolvedConductor {
                conductor: self.default_conductor(),
                fallback: true,
            },
        }
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_contains_drake_as_default() {
        let catalog = ConductorCatalog::builtin();
        let drake = catalog.default_conductor();
        assert_eq!(drake.name, DEFAULT_CONDUCTOR);
        assert_eq!(drake.diameter_mm, 28.14);
        assert_eq!(drake.r25_ohm_per_km, 0.0724);
        assert_eq!(drake.alpha_per_c, 0.00404);
        assert!(catalog.iter().all(|c| c.validate().is_ok()));
    }

    #[test]
    fn resolve_is_case_and_whitespace_insensitive() {
        let catalog = ConductorCatalog::builtin();
        let hit = catalog.resolve("  477 acsr   26/7 hawk ");
        assert!(!hit.fallback);
        assert_eq!(hit.conductor.code_word, "HAWK");
    }

    #[test]
    fn resolve_matches_code_word_token() {
        let catalog = ConductorCatalog::builtin();
        let hit = catalog.resolve("Bittern");
        assert!(!hit.fallback);
        assert_eq!(hit.conductor.name, "1272 ACSR 45/7 BITTERN");

        // "RAILWAY" must not match the RAIL token
        let miss = catalog.resolve("RAILWAY SPECIAL");
        assert!(miss.fallback);
    }

    #[test]
    fn unknown_conductor_falls_back_to_default() {
        let catalog = ConductorCatalog::builtin();
        let hit = catalog.resolve("Unobtainium 9000");
        assert!(hit.fallback);
        assert_eq!(hit.conductor.name, DEFAULT_CONDUCTOR);

        let empty = catalog.resolve("");
        assert!(empty.fallback);
    }

    #[test]
    fn resistance_scales_with_temperature() {
        let catalog = ConductorCatalog::builtin();
        let drake = catalog.default_conductor();
        let r25 = drake.resistance_at(25.0);
        assert!((r25 - 0.0724e-3).abs() < 1e-12);
        let r100 = drake.resistance_at(100.0);
        assert!((r100 - 0.0724e-3 * (1.0 + 0.00404 * 75.0)).abs() < 1e-12);
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut catalog = ConductorCatalog::builtin();
        let before = catalog.len();
        let mut custom = catalog.default_conductor().clone();
        custom.emissivity = 0.8;
        catalog.insert(custom);
        assert_eq!(catalog.len(), before);
        assert_eq!(catalog.default_conductor().emissivity, 0.8);

        catalog.insert(acsr("556.5 ACSR 26/7 DOVE", "DOVE", 23.55, 0.1022));
        assert_eq!(catalog.len(), before + 1);
        assert!(!catalog.resolve("dove").fallback);
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let mut bad = acsr("X", "X", 0.0, 0.1);
        assert!(bad.validate().is_err());
        bad.diameter_mm = 10.0;
        bad.emissivity = 1.5;
        assert!(bad.validate().is_err());
    }
}
