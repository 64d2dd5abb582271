//! Environmental input for one rating computation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::units::{Celsius, Degrees, MetersPerSecond};

/// Load scenario applied to every line's nominal flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadScenario {
    Min,
    #[default]
    Nominal,
    Max,
}

impl LoadScenario {
    pub fn multiplier(self) -> f64 {
        match self {
            LoadScenario::Min => 0.85,
            LoadScenario::Nominal => 1.0,
            LoadScenario::Max => 1.15,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoadScenario::Min => "min",
            LoadScenario::Nominal => "nominal",
            LoadScenario::Max => "max",
        }
    }
}

impl fmt::Display for LoadScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadScenario {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "min" | "low" => Ok(LoadScenario::Min),
            "nominal" | "nom" | "base" => Ok(LoadScenario::Nominal),
            "max" | "high" => Ok(LoadScenario::Max),
            other => Err(format!(
                "unknown load scenario '{}'; supported values: min, nominal, max",
                other
            )),
        }
    }
}

/// Weather and loading conditions shared by every line in a computation.
///
/// `wind_direction` is the compass direction the wind blows *from*.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub ambient: Celsius,
    pub wind_speed: MetersPerSecond,
    pub wind_direction: Degrees,
    #[serde(default)]
    pub scenario: LoadScenario,
}

impl Default for Environment {
    /// 25 °C, 0.61 m/s (2 ft/s) from the north, nominal load.
    fn default() -> Self {
        Self {
            ambient: Celsius(25.0),
            wind_speed: MetersPerSecond(0.61),
            wind_direction: Degrees(0.0),
            scenario: LoadScenario::Nominal,
        }
    }
}

impl Environment {
    pub fn new(ambient_c: f64, wind_speed_ms: f64, wind_direction_deg: f64) -> Self {
        Self {
            ambient: Celsius(ambient_c),
            wind_speed: MetersPerSecond(wind_speed_ms),
            wind_direction: Degrees(wind_direction_deg),
            scenario: LoadScenario::Nominal,
        }
    }

    pub fn with_scenario(mut self, scenario: LoadScenario) -> Self {
        self.scenario = scenario;
        self
    }

    pub fn with_ambient(mut self, ambient_c: f64) -> Self {
        self.ambient = Celsius(ambient_c);
        self
    }
}
