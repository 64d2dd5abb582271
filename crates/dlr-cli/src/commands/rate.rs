use anyhow::Result;
use dlr_algo::stress::round1;
use dlr_algo::{attack_angle, RatingInputs, StressEngine};
use dlr_core::{Celsius, Degrees, MetersPerSecond};
use serde::Serialize;
use tracing::info;

use dlr_cli::OutputFormat;

use crate::common::print_json;

#[derive(Debug, Clone, Copy)]
pub struct Conditions {
    pub ambient: f64,
    pub wind_speed: f64,
    pub wind_dir: f64,
    pub azimuth: f64,
    pub mot: f64,
}

#[derive(Debug, Serialize)]
struct RateOutput<'a> {
    conductor: &'a str,
    fallback: bool,
    ambient_c: f64,
    wind_speed_ms: f64,
    attack_angle_deg: f64,
    mot_c: f64,
    ampacity_a: f64,
}

pub fn handle(
    engine: &StressEngine,
    conductor: &str,
    conditions: Conditions,
    format: OutputFormat,
) -> Result<()> {
    let inputs = RatingInputs {
        ambient: Celsius(conditions.ambient),
        wind_speed: MetersPerSecond(conditions.wind_speed),
        wind_direction: Degrees(conditions.wind_dir),
        line_azimuth: Degrees(conditions.azimuth),
        mot: Celsius(conditions.mot),
    };
    let (rating, fallback) = engine.rate(conductor, &inputs);
    let resolved = engine.catalog().resolve(conductor).conductor;
    info!(conductor = %resolved.name, rating_a = rating.value(), "rated");

    let output = RateOutput {
        conductor: &resolved.name,
        fallback,
        ambient_c: conditions.ambient,
        wind_speed_ms: conditions.wind_speed,
        attack_angle_deg: round1(attack_angle(inputs.wind_direction, inputs.line_azimuth).value()),
        mot_c: conditions.mot,
        ampacity_a: round1(rating.value()),
    };
    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => {
            println!("Conductor : {}", output.conductor);
            if fallback {
                println!("            (unknown '{conductor}', rated as the default conductor)");
            }
            println!(
                "Conditions: {:.1} °C ambient, {:.2} m/s wind at {:.1}° attack, MOT {:.0} °C",
                output.ambient_c, output.wind_speed_ms, output.attack_angle_deg, output.mot_c
            );
            println!("Ampacity  : {:.1} A", output.ampacity_a);
            Ok(())
        }
    }
}
