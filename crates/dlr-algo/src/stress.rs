//! Per-line stress: actual current against the dynamic rating.

use dlr_core::{Amperes, Celsius, Conductor, Degrees, Kilovolts, LineId, Megawatts, MetersPerSecond};
use serde::{Deserialize, Serialize};

use crate::thermal::{ampacity, RatingInputs, ThermalParams};

/// Bounds of the overload-temperature bisection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverloadSearch {
    pub min_ambient_c: f64,
    pub max_ambient_c: f64,
    pub iterations: u32,
}

impl Default for OverloadSearch {
    /// 0–60 °C in 24 halvings, well under 0.01 °C
    fn default() -> Self {
        Self {
            min_ambient_c: 0.0,
            max_ambient_c: 60.0,
            iterations: 24,
        }
    }
}

/// Balanced three-phase current at unity power factor:
/// `|P| · multiplier · 1000 / (√3 · kV)`.
///
/// Zero for a missing or non-positive voltage and for non-finite flows.
pub fn actual_current(flow: Megawatts, multiplier: f64, voltage: Kilovolts) -> Amperes {
    let current = (flow * multiplier).three_phase_current(voltage);
    if current.is_finite() {
        current
    } else {
        Amperes(0.0)
    }
}

/// `100 · actual / rating`, or 0 when the rating is not positive.
pub fn stress_pct(actual: Amperes, rating: Amperes) -> f64 {
    let (actual, rating) = (actual.value(), rating.value());
    if !(rating.is_finite() && rating > 0.0 && actual.is_finite()) {
        return 0.0;
    }
    100.0 * actual / rating
}

/// Ambient temperature at which the rating drops to `actual`.
///
/// - `Some(min)` when the line is already overloaded at the bottom of the range
/// - `None` when it is still within rating at the top of the range
/// - otherwise the bisected crossing point
///
/// Relies on the rating being non-increasing in ambient temperature.
#[allow(clippy::too_many_arguments)]
pub fn solve_overload_temperature(
    conductor: &Conductor,
    params: &ThermalParams,
    line_azimuth: Degrees,
    mot: Celsius,
    wind_speed: MetersPerSecond,
    wind_direction: Degrees,
    actual: Amperes,
    search: &OverloadSearch,
) -> Option<Celsius> {
    let rating_at = |ambient: f64| {
        ampacity(
            conductor,
            params,
            &RatingInputs {
                ambient: Celsius(ambient),
                wind_speed,
                wind_direction,
                line_azimuth,
                mot,
            },
        )
        .value()
    };
    let overloaded_at = |ambient: f64| rating_at(ambient) <= actual.value();

    let (mut lo, mut hi) = (search.min_ambient_c, search.max_ambient_c);
    if overloaded_at(lo) {
        return Some(Celsius(lo));
    }
    if !overloaded_at(hi) {
        return None;
    }
    for _ in 0..search.iterations {
        let mid = 0.5 * (lo + hi);
        if overloaded_at(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Some(Celsius(0.5 * (lo + hi)))
}

/// Stress result for one line under one set of conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStress {
    pub id: LineId,
    pub name: String,
    pub rating_a: f64,
    pub actual_a: f64,
    pub stress_pct: f64,
    pub overload_temp_c: Option<f64>,
    /// The line's conductor was not recognized and the default was used
    pub conductor_fallback: bool,
}

impl LineStress {
    /// Display copy with currents and stress rounded to one decimal.
    pub fn rounded(&self) -> LineStress {
        LineStress {
            id: self.id.clone(),
            name: self.name.clone(),
            rating_a: round1(self.rating_a),
            actual_a: round1(self.actual_a),
            stress_pct: round1(self.stress_pct),
            overload_temp_c: self.overload_temp_c.map(round1),
            conductor_fallback: self.conductor_fallback,
        }
    }
}

/// Round half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlr_core::ConductorCatalog;

    #[test]
    fn current_matches_three_phase_formula() {
        let current = actual_current(Megawatts(-100.0), 1.15, Kilovolts(230.0)).value();
        let expected = 100.0 * 1.15 * 1000.0 / (3f64.sqrt() * 230.0);
        assert!((current - expected).abs() < 1e-9);
        assert_eq!(actual_current(Megawatts(100.0), 1.0, Kilovolts(0.0)).value(), 0.0);
        assert_eq!(actual_current(Megawatts(f64::NAN), 1.0, Kilovolts(230.0)).value(), 0.0);
    }

    #[test]
    fn stress_definition() {
        assert_eq!(stress_pct(Amperes(500.0), Amperes(0.0)), 0.0);
        assert_eq!(stress_pct(Amperes(500.0), Amperes(-10.0)), 0.0);
        assert_eq!(stress_pct(Amperes(500.0), Amperes(f64::NAN)), 0.0);
        assert_eq!(stress_pct(Amperes(321.0), Amperes(797.0)), 100.0 * 321.0 / 797.0);
    }

    fn solve(actual: f64) -> Option<Celsius> {
        let catalog = ConductorCatalog::builtin();
        solve_overload_temperature(
            catalog.default_conductor(),
            &ThermalParams::default(),
            Degrees(0.0),
            Celsius(100.0),
            MetersPerSecond(0.61),
            Degrees(45.0),
            Amperes(actual),
            &OverloadSearch::default(),
        )
    }

    #[test]
    fn overload_temperature_crossing() {
        // Rating runs from about 690 A at 0 °C to about 481 A at 60 °C
        let temp = solve(600.0).unwrap().value();
        assert!(temp > 0.0 && temp < 60.0);

        let catalog = ConductorCatalog::builtin();
        let rating = ampacity(
            catalog.default_conductor(),
            &ThermalParams::default(),
            &RatingInputs {
                ambient: Celsius(temp),
                wind_speed: MetersPerSecond(0.61),
                wind_direction: Degrees(45.0),
                line_azimuth: Degrees(0.0),
                mot: Celsius(100.0),
            },
        )
        .value();
        assert!((rating - 600.0).abs() < 0.01, "rating at crossing {rating}");
    }

    #[test]
    fn overload_temperature_edges() {
        assert_eq!(solve(5000.0), Some(Celsius(0.0)));
        assert_eq!(solve(100.0), None);
        assert_eq!(solve(0.0), None);
    }

    #[test]
    fn rounding_for_display() {
        let stress = LineStress {
            id: LineId::new("L1"),
            name: "L1".into(),
            rating_a: 796.699,
            actual_a: 251.04,
            stress_pct: 31.5099,
            overload_temp_c: Some(41.26),
            conductor_fallback: false,
        };
        let shown = stress.rounded();
        assert_eq!(shown.rating_a, 796.7);
        assert_eq!(shown.actual_a, 251.0);
        assert_eq!(shown.stress_pct, 31.5);
        assert_eq!(shown.overload_temp_c, Some(41.3));
        // Internal value untouched
        assert_eq!(stress.stress_pct, 31.5099);
    }
}
