//! Steady-state conductor heat balance.
//!
//! A simplified IEEE-738 style balance: the current that makes resistive heating
//! at the maximum operating temperature equal convective plus radiative cooling.
//!
//! ```text
//! I²·R(MOT) = q_c + q_r            (solar gain taken as zero)
//!
//! q_c = π · k_air · Nu · (MOT − Ta) · sin(φ)
//! Nu  = C · Re^n,  Re = max(V, V_min) · D / ν
//! q_r = ε · σ · π · D · (Tc⁴ − Ta⁴)     (kelvin)
//! ```
//!
//! `φ` is the attack angle between the wind and the line axis, in `[0°, 90°]`.
//! The Nusselt coefficient is a conservative calibration rather than the
//! standard's forced-convection correlation, so ratings sit well below
//! published tables for high wind. Solar heating is omitted to keep results a
//! pure function of the inputs.
//!
//! Every term is non-increasing in ambient temperature, so the rating is too.
//! [`crate::stress::solve_overload_temperature`] relies on this.

use dlr_core::{Amperes, Celsius, Conductor, Degrees, MetersPerSecond};
use serde::{Deserialize, Serialize};

/// Stefan–Boltzmann constant, W/(m²·K⁴)
pub const STEFAN_BOLTZMANN: f64 = 5.670_374_419e-8;

/// Physical constants and clamps of the heat balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalParams {
    /// Thermal conductivity of air, W/(m·K)
    pub air_conductivity: f64,
    /// Kinematic viscosity of air, m²/s
    pub kinematic_viscosity: f64,
    pub nusselt_coefficient: f64,
    pub nusselt_exponent: f64,
    /// Effective wind speed floor, m/s (natural convection stand-in)
    pub min_wind_speed: f64,
    /// Lowest rating ever reported, A
    pub rating_floor_a: f64,
}

impl Default for ThermalParams {
    fn default() -> Self {
        Self {
            air_conductivity: 0.0262,
            kinematic_viscosity: 1.5e-5,
            nusselt_coefficient: 0.052,
            nusselt_exponent: 0.5,
            min_wind_speed: 0.5,
            rating_floor_a: 100.0,
        }
    }
}

/// Weather and line orientation seen by one conductor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingInputs {
    pub ambient: Celsius,
    pub wind_speed: MetersPerSecond,
    /// Direction the wind blows from
    pub wind_direction: Degrees,
    pub line_azimuth: Degrees,
    pub mot: Celsius,
}

/// Angle between wind and line axis, folded into `[0, 90]`.
///
/// A line has no direction, so wind at 120° to the azimuth attacks it exactly
/// like wind at 60°. Wind along the line in either sense gives 0°.
pub fn attack_angle(wind_direction: Degrees, line_azimuth: Degrees) -> Degrees {
    let diff = (wind_direction.normalized().value() - line_azimuth.normalized().value()).abs();
    let smallest = diff.min(360.0 - diff);
    let folded = if smallest > 90.0 { 180.0 - smallest } else { smallest };
    Degrees(folded.clamp(0.0, 90.0))
}

/// Forced-convection loss per metre, W/m. Negative when MOT is below ambient.
pub fn convective_loss(
    conductor: &Conductor,
    params: &ThermalParams,
    ambient: Celsius,
    mot: Celsius,
    wind_speed: MetersPerSecond,
    attack: Degrees,
) -> f64 {
    let diameter = conductor.diameter_m();
    let speed = wind_speed.value().max(params.min_wind_speed);
    let reynolds = speed * diameter / params.kinematic_viscosity;
    let nusselt = params.nusselt_coefficient * reynolds.powf(params.nusselt_exponent);
    let direction_factor = attack.to_radians().sin();
    std::f64::consts::PI
        * params.air_conductivity
        * nusselt
        * (mot.value() - ambient.value())
        * direction_factor
}

/// Radiative loss per metre, W/m. Negative when MOT is below ambient.
pub fn radiative_loss(conductor: &Conductor, ambient: Celsius, mot: Celsius) -> f64 {
    let perimeter = std::f64::consts::PI * conductor.diameter_m();
    conductor.emissivity
        * STEFAN_BOLTZMANN
        * perimeter
        * (mot.to_kelvin().powi(4) - ambient.to_kelvin().powi(4))
}

/// Maximum steady-state current that keeps the conductor at or below MOT.
///
/// Always finite and at least `params.rating_floor_a`. Degenerate inputs (NaN
/// weather, MOT at or below ambient) land on the floor instead of producing a
/// zero, negative or NaN rating.
pub fn ampacity(conductor: &Conductor, params: &ThermalParams, inputs: &RatingInputs) -> Amperes {
    let attack = attack_angle(inputs.wind_direction, inputs.line_azimuth);
    let q_c = convective_loss(
        conductor,
        params,
        inputs.ambient,
        inputs.mot,
        inputs.wind_speed,
        attack,
    );
    let q_r = radiative_loss(conductor, inputs.ambient, inputs.mot);
    // f64::max discards NaN, so a NaN budget collapses to zero
    let budget = (q_c + q_r).max(0.0);
    let resistance = conductor.resistance_at(inputs.mot.value());

    let current = if resistance.is_finite() && resistance > 0.0 {
        (budget / resistance).sqrt()
    } else {
        0.0
    };
    if current.is_finite() {
        Amperes(current.max(params.rating_floor_a))
    } else {
        Amperes(params.rating_floor_a)
    }
}
